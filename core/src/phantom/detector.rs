use super::labeling::{label_components, Component, Connectivity};
use super::otsu::otsu_threshold;
use crate::types::{DetectorConfig, Image};
use log::{debug, warn};

/// Location and size of the detected phantom, in pixels
///
/// Coordinates are truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PhantomGeometry {
    pub center_y: usize,
    pub center_x: usize,
    pub radius_px: usize,
    /// False when the fallback geometry was substituted
    pub detected: bool,
}

impl PhantomGeometry {
    /// Image center with a radius of a quarter of the smaller dimension
    pub fn fallback(image: &Image) -> Self {
        let (center_y, center_x) = image.center();
        Self {
            center_y,
            center_x,
            radius_px: image.rows().min(image.cols()) / 4,
            detected: false,
        }
    }
}

/// Otsu + connected-component phantom detector
///
/// # Example
///
/// ```
/// use phantomqa_core::{Image, PhantomDetector};
/// use ndarray::Array2;
///
/// let pixels = Array2::from_shape_fn((128, 128), |(r, c)| {
///     let (dy, dx) = (r as f64 - 64.0, c as f64 - 64.0);
///     if dy * dy + dx * dx <= 30.0 * 30.0 { 800.0 } else { 0.0 }
/// });
/// let geometry = PhantomDetector::default().detect(&Image::new(pixels));
///
/// assert!(geometry.detected);
/// assert_eq!((geometry.center_y, geometry.center_x), (64, 64));
/// assert!((29..=30).contains(&geometry.radius_px));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PhantomDetector {
    config: DetectorConfig,
}

impl PhantomDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detects the largest bright object; never fails
    ///
    /// Falls back to [`PhantomGeometry::fallback`] when no component
    /// survives the size filter.
    pub fn detect(&self, image: &Image) -> PhantomGeometry {
        match self.largest_component(image) {
            Some(component) => {
                let (cy, cx) = component.centroid();
                let geometry = PhantomGeometry {
                    center_y: cy as usize,
                    center_x: cx as usize,
                    radius_px: component.equivalent_radius() as usize,
                    detected: true,
                };
                debug!(
                    "Phantom at ({}, {}), area {} px, radius {} px",
                    geometry.center_x, geometry.center_y, component.area, geometry.radius_px
                );
                geometry
            }
            None => {
                warn!("No circular object detected. Using image center as fallback.");
                PhantomGeometry::fallback(image)
            }
        }
    }

    fn largest_component(&self, image: &Image) -> Option<Component> {
        if image.is_empty() {
            return None;
        }

        let pixels = image.pixels();
        let threshold = otsu_threshold(pixels.iter());
        let binary = pixels.mapv(|v| v > threshold);

        // Speck removal uses edge adjacency, labeling of the survivors uses full adjacency
        let (labels, specks) = label_components(&binary, Connectivity::Four);
        let keep: Vec<bool> = std::iter::once(false)
            .chain(specks.iter().map(|c| c.area >= self.config.min_object_px))
            .collect();
        let filtered = labels.mapv(|label| keep[label as usize]);

        let (_, components) = label_components(&filtered, Connectivity::Eight);
        components.into_iter().fold(None, |best, c| match best {
            Some(b) if b.area >= c.area => Some(b),
            _ => Some(c),
        })
    }
}
