//! Phantom segmentation
//!
//! Locates the dominant bright object in a slice with an Otsu threshold
//! followed by connected-component analysis.

mod detector;
mod labeling;
mod otsu;

pub use detector::{PhantomDetector, PhantomGeometry};
pub use labeling::{label_components, Component, Connectivity};
pub use otsu::otsu_threshold;
