//! QA workflow orchestration
//!
//! Each workflow loads scans through a [`ScanSource`], builds its ROIs,
//! measures them and returns plain result records. Non-fatal conditions go
//! to the caller's [`Diagnostics`]; every measured mask is also shown to a
//! [`RoiInspector`].

mod nema_body;
mod torso;
mod weekly;

pub use nema_body::{
    discover_entries, NemaBodyReport, NemaBodyWorkflow, NemaEntry, NemaLayout, NemaRecord,
};
pub use torso::{CombinedRecord, ElementRecord, TorsoReport, TorsoWorkflow};
pub use weekly::{WeeklyRecord, WeeklyReport, WeeklyWorkflow};

use crate::diagnostics::{Diagnostics, QaWarning};
use crate::error::QaError;
use crate::metrics::RoiStats;
use crate::render::RoiInspector;
use crate::roi::RoiMask;
use crate::source::{Scan, ScanSource};
use crate::types::Image;
use log::{debug, error};
use std::path::Path;

/// Loads a scan, recording a skip on failure
fn load_scan<S: ScanSource>(source: &S, path: &Path, diagnostics: &mut Diagnostics) -> Option<Scan> {
    match source.read_scan(path) {
        Ok(scan) => Some(scan),
        Err(e) => {
            error!("Error loading file '{}': {}", path.display(), e);
            diagnostics.skipped(path, e);
            None
        }
    }
}

/// Measures one mask, forwarding its notes and showing it to the inspector
///
/// Returns `None` (with an [`QaWarning::EmptyRoi`]) when the mask selects
/// nothing.
fn measure(
    label: &str,
    path: &Path,
    image: &Image,
    roi: &RoiMask,
    inspector: &mut dyn RoiInspector,
    diagnostics: &mut Diagnostics,
) -> Option<RoiStats> {
    debug!(
        "Measuring {} ROI '{}': center ({:.1}, {:.1}), radius {:.1} px",
        roi.mode, label, roi.center_x, roi.center_y, roi.radius_px
    );
    diagnostics.record_roi(path, roi);
    inspector.inspect(label, image, roi);
    match RoiStats::compute(image, roi) {
        Ok(stats) => Some(stats),
        Err(QaError::EmptyRoi) => {
            diagnostics.push(QaWarning::EmptyRoi {
                file: path.to_path_buf(),
            });
            None
        }
        Err(e) => {
            diagnostics.skipped(path, e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::api::ScanMetadata;
    use crate::types::{Image, ImageType, PixelSpacing};
    use ndarray::Array2;

    /// Uniform disk on a zero background
    pub fn disk_image(rows: usize, cols: usize, cy: f64, cx: f64, r: f64, value: f64) -> Image {
        Image::new(Array2::from_shape_fn((rows, cols), |(y, x)| {
            let (dy, dx) = (y as f64 - cy, x as f64 - cx);
            if dy * dy + dx * dx <= r * r {
                value
            } else {
                0.0
            }
        }))
    }

    /// Checkerboard of `±amplitude`: mean 0, standard deviation `amplitude`
    pub fn noise_image(rows: usize, cols: usize, amplitude: f64) -> Image {
        Image::new(Array2::from_shape_fn((rows, cols), |(y, x)| {
            if (y + x) % 2 == 0 {
                amplitude
            } else {
                -amplitude
            }
        }))
    }

    pub fn metadata(description: &str, coil: &[&str], norm: bool) -> ScanMetadata {
        let flags = if norm { vec!["NORM".to_string()] } else { Vec::new() };
        ScanMetadata {
            series_description: description.to_lowercase(),
            coil_labels: coil.iter().map(|s| s.to_string()).collect(),
            image_type: ImageType::new("ORIGINAL".to_string(), "PRIMARY".to_string(), flags),
            pixel_spacing: PixelSpacing::default(),
            ..Default::default()
        }
    }
}
