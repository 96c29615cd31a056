use std::fmt;

/// DICOM ImageType field decomposed into its components
///
/// - `pixels`: First element (e.g., "ORIGINAL", "DERIVED")
/// - `exam`: Second element (e.g., "PRIMARY", "SECONDARY")
/// - `flags`: Every value after the first two (e.g., "M", "ND", "NORM")
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ImageType {
    pub pixels: String,
    pub exam: String,
    pub flags: Vec<String>,
}

impl ImageType {
    /// Creates a new ImageType
    pub fn new(pixels: String, exam: String, flags: Vec<String>) -> Self {
        Self {
            pixels,
            exam,
            flags,
        }
    }

    /// Builds an ImageType from the raw multi-valued tag
    pub fn from_values(values: &[String]) -> Self {
        Self {
            pixels: values.first().cloned().unwrap_or_default(),
            exam: values.get(1).cloned().unwrap_or_default(),
            flags: values.iter().skip(2).cloned().collect(),
        }
    }

    /// Checks if any component equals `val`, ignoring ASCII case
    pub fn contains(&self, val: &str) -> bool {
        self.pixels.eq_ignore_ascii_case(val)
            || self.exam.eq_ignore_ascii_case(val)
            || self.flags.iter().any(|x| x.eq_ignore_ascii_case(val))
    }

    /// Whether the scanner applied its intensity normalization filter
    pub fn is_normalized(&self) -> bool {
        self.contains("NORM")
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![self.pixels.as_str(), self.exam.as_str()];
        parts.extend(self.flags.iter().map(String::as_str));
        write!(f, "{}", parts.join("\\"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &str) -> Vec<String> {
        raw.split('\\').map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_values() {
        let it = ImageType::from_values(&values("DERIVED\\PRIMARY\\M\\ND\\NORM"));
        assert_eq!(it.pixels, "DERIVED");
        assert_eq!(it.exam, "PRIMARY");
        assert_eq!(it.flags, vec!["M", "ND", "NORM"]);
        assert_eq!(it.to_string(), "DERIVED\\PRIMARY\\M\\ND\\NORM");
    }

    #[test]
    fn test_norm_flag_detected_case_insensitively() {
        assert!(ImageType::from_values(&values("ORIGINAL\\PRIMARY\\M\\norm")).is_normalized());
        assert!(!ImageType::from_values(&values("ORIGINAL\\PRIMARY\\M\\ND")).is_normalized());
        assert!(!ImageType::from_values(&values("ORIGINAL\\PRIMARY\\NORMAL")).is_normalized());
    }
}
