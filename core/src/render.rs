//! Optional ROI overlays
//!
//! Workflows hand every (image, mask) pair they measure to a
//! [`RoiInspector`]. The unit type ignores them; [`OverlayWriter`] saves a
//! PNG per mask. Nothing here feeds back into the metrics.

use crate::error::{QaError, Result};
use crate::roi::RoiMask;
use crate::types::Image;
use image::{Rgb, RgbImage};
use log::{debug, warn};
use std::path::{Path, PathBuf};

const ROI_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Receiver of the masks a workflow builds
pub trait RoiInspector {
    /// Called once per mask, `label` naming the scan and ROI role
    fn inspect(&mut self, label: &str, image: &Image, roi: &RoiMask);
}

impl RoiInspector for () {
    fn inspect(&mut self, _label: &str, _image: &Image, _roi: &RoiMask) {}
}

/// Grayscale rendering of `image` with the ROI boundary in red
///
/// Intensities are stretched linearly from the frame minimum to its maximum.
pub fn render_overlay(image: &Image, roi: &RoiMask) -> RgbImage {
    let pixels = image.pixels();
    let (min, max) = pixels
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    RgbImage::from_fn(image.cols() as u32, image.rows() as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        if is_boundary(roi, y, x) {
            return ROI_COLOR;
        }
        let level = if range > 0.0 {
            ((pixels[[y, x]] - min) / range * 255.0).round() as u8
        } else {
            0
        };
        Rgb([level, level, level])
    })
}

/// Selected pixel with at least one unselected edge neighbour
fn is_boundary(roi: &RoiMask, y: usize, x: usize) -> bool {
    if !roi.contains(y, x) {
        return false;
    }
    let up = y.checked_sub(1).map_or(false, |yy| roi.contains(yy, x));
    let left = x.checked_sub(1).map_or(false, |xx| roi.contains(y, xx));
    !(up && left && roi.contains(y + 1, x) && roi.contains(y, x + 1))
}

/// Writes `<label>_roi_overlay.png` files into a directory
#[derive(Debug, Clone)]
pub struct OverlayWriter {
    directory: PathBuf,
    written: Vec<PathBuf>,
}

impl OverlayWriter {
    /// Creates the writer, creating `directory` if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            written: Vec::new(),
        })
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, label: &str) -> PathBuf {
        let stem: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}_roi_overlay.png", stem))
    }

    fn write(&self, path: &Path, image: &Image, roi: &RoiMask) -> Result<()> {
        render_overlay(image, roi)
            .save(path)
            .map_err(|e| QaError::Render(e.to_string()))
    }
}

impl RoiInspector for OverlayWriter {
    fn inspect(&mut self, label: &str, image: &Image, roi: &RoiMask) {
        let path = self.path_for(label);
        match self.write(&path, image, roi) {
            Ok(()) => {
                debug!("Wrote overlay {}", path.display());
                self.written.push(path);
            }
            Err(e) => warn!("Could not write overlay {}: {}", path.display(), e),
        }
    }
}
