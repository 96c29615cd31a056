use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Physical size of one pixel in millimeters
///
/// `x` holds the first value of the DICOM PixelSpacing pair and `y` the
/// second. Radii derived from a physical area use `x` alone (phantom ROIs)
/// or the average of both (central and peak ROIs).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PixelSpacing {
    pub x: f64,
    pub y: f64,
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds a spacing from the decoded tag values
    ///
    /// Fewer than two values, or a non-positive value, yields the 1.0 mm default.
    pub fn from_values(values: &[f64]) -> Self {
        match values {
            [x, y, ..] if *x > 0.0 && *y > 0.0 => Self::new(*x, *y),
            _ => Self::default(),
        }
    }

    /// Mean of the two spacings
    pub fn average(&self) -> f64 {
        (self.x + self.y) / 2.0
    }

    /// Parses pixel spacing from string
    ///
    /// Accepts formats like:
    /// - "0.9375\\0.9375"
    /// - "0.9375 0.9375"
    /// - "[0.9375, 0.9375]"
    /// - Exponential notation: "9.375e-1 9.375e-1"
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
        });

        let mut numbers = re.find_iter(s).map(|m| m.as_str());
        let x_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;
        let y_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;

        let x: f64 = x_str
            .parse()
            .map_err(|e| format!("Failed to parse x value: {}", e))?;
        let y: f64 = y_str
            .parse()
            .map_err(|e| format!("Failed to parse y value: {}", e))?;

        Ok(PixelSpacing { x, y })
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} mm", self.x, self.y)
    }
}
