//! Circular region-of-interest construction
//!
//! Three placement strategies share one mask shape:
//! - [`RoiBuilder::phantom_constrained`]: sized to a target area, centered on
//!   the detected phantom and kept inside it
//! - [`RoiBuilder::fixed_central`]: fixed area at the image center
//! - [`RoiBuilder::peak_seeking`]: small fixed radius on the brightest pixel
//!
//! Every mask satisfies `radius_px >= 1` and keeps its whole disk inside the
//! image.

use crate::phantom::{PhantomDetector, PhantomGeometry};
use crate::types::{CentralRoiSpec, Image, PeakRoiSpec, PhantomRoiSpec, PixelSpacing};
use log::{debug, warn};
use ndarray::Array2;
use std::f64::consts::PI;
use std::fmt;

/// Gap between the disk edge and the image border for area-based ROIs
const BORDER_PX: f64 = 1.0;

/// How the ROI center and radius were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum RoiMode {
    PhantomConstrained,
    FixedCentral,
    PeakSeeking,
}

impl fmt::Display for RoiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoiMode::PhantomConstrained => "phantom",
            RoiMode::FixedCentral => "central",
            RoiMode::PeakSeeking => "peak",
        };
        write!(f, "{}", name)
    }
}

/// Non-fatal condition met while building a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiNote {
    /// Segmentation found nothing; the fallback geometry was used
    PhantomNotDetected,
    /// Computed radius fell below one pixel and was forced to 1
    DegenerateRadius,
    /// No positive pixel to seek; the image center was used
    PeakNotFound,
    /// Radius shrunk so the disk fits in the image
    RadiusClamped,
}

/// Boolean disk over an image plus the geometry that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RoiMask {
    mask: Array2<bool>,
    pub center_x: f64,
    pub center_y: f64,
    pub radius_px: f64,
    pub mode: RoiMode,
    pub notes: Vec<RoiNote>,
}

impl RoiMask {
    /// Builds the disk `(x - cx)² + (y - cy)² <= r²` over a `rows x cols` grid
    pub fn disk(
        rows: usize,
        cols: usize,
        center_x: f64,
        center_y: f64,
        radius_px: f64,
        mode: RoiMode,
    ) -> Self {
        let r2 = radius_px * radius_px;
        let mask = Array2::from_shape_fn((rows, cols), |(y, x)| {
            let dx = x as f64 - center_x;
            let dy = y as f64 - center_y;
            dx * dx + dy * dy <= r2
        });
        Self {
            mask,
            center_x,
            center_y,
            radius_px,
            mode,
            notes: Vec::new(),
        }
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn contains(&self, y: usize, x: usize) -> bool {
        self.mask.get((y, x)).copied().unwrap_or(false)
    }

    /// Number of selected pixels
    pub fn pixel_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Intensities of the selected pixels, in raster order
    pub fn select(&self, image: &Image) -> Vec<f64> {
        let pixels = image.pixels();
        self.mask
            .indexed_iter()
            .filter(|(_, &m)| m)
            .filter_map(|(idx, _)| pixels.get(idx).copied())
            .collect()
    }

    pub fn has_note(&self, note: RoiNote) -> bool {
        self.notes.contains(&note)
    }

    fn with_notes(mut self, notes: Vec<RoiNote>) -> Self {
        self.notes = notes;
        self
    }
}

/// Radius of the circle with the given area
fn radius_for_area(area_mm2: f64) -> f64 {
    (area_mm2.max(0.0) / PI).sqrt()
}

/// Clamps one center coordinate into `[margin, extent - margin]`
///
/// When the interval is empty the midpoint of the axis is used.
fn clamp_axis(value: f64, extent: usize, margin: f64) -> f64 {
    let lo = margin;
    let hi = extent as f64 - margin;
    if lo > hi {
        (extent / 2) as f64
    } else {
        value.clamp(lo, hi)
    }
}

/// Largest radius whose disk (plus border) still fits in the image
fn max_fitting_radius(image: &Image) -> f64 {
    ((image.rows().min(image.cols()) as f64) / 2.0 - BORDER_PX).floor()
}

/// Forces `radius >= 1` and `radius <= max_fitting_radius`, recording why
fn bound_radius(image: &Image, radius: f64, notes: &mut Vec<RoiNote>) -> f64 {
    let mut radius = radius;
    let limit = max_fitting_radius(image);
    if radius > limit {
        warn!(
            "ROI radius {:.1} px exceeds the {}x{} image, clamping to {} px",
            radius,
            image.cols(),
            image.rows(),
            limit
        );
        radius = limit;
        notes.push(RoiNote::RadiusClamped);
    }
    if !(radius >= 1.0) {
        warn!("Computed ROI radius is too small, defaulting to 1 pixel.");
        radius = 1.0;
        notes.push(RoiNote::DegenerateRadius);
    }
    radius
}

/// Builds ROI masks for the QA workflows
#[derive(Debug, Clone, Default)]
pub struct RoiBuilder {
    detector: PhantomDetector,
}

impl RoiBuilder {
    pub fn new(detector: PhantomDetector) -> Self {
        Self { detector }
    }

    /// Signal ROI of a target area placed inside the detected phantom
    ///
    /// The radius comes from the area and the x spacing, rounded to whole
    /// pixels. The centroid is shifted down by the configured offset, then the
    /// radius is reduced to stay `object_margin_px` inside the phantom.
    pub fn phantom_constrained(
        &self,
        image: &Image,
        spacing: PixelSpacing,
        spec: &PhantomRoiSpec,
    ) -> RoiMask {
        let geometry = self.detector.detect(image);
        Self::constrain_to_phantom(image, spacing, spec, &geometry)
    }

    /// [`phantom_constrained`](Self::phantom_constrained) with a precomputed geometry
    pub fn constrain_to_phantom(
        image: &Image,
        spacing: PixelSpacing,
        spec: &PhantomRoiSpec,
        geometry: &PhantomGeometry,
    ) -> RoiMask {
        let mut notes = Vec::new();
        if !geometry.detected {
            notes.push(RoiNote::PhantomNotDetected);
        }

        let radius_mm = radius_for_area(spec.target_area_mm2);
        let target_radius = (radius_mm / spacing.x).round().max(1.0);

        let center_x = geometry.center_x as f64;
        let center_y = (geometry.center_y as f64 + spec.vertical_offset_px)
            .min(image.rows() as f64 - target_radius - 1.0);

        let object_limit = geometry.radius_px as f64 - spec.object_margin_px as f64;
        let radius = bound_radius(image, target_radius.min(object_limit), &mut notes);

        let margin = radius + BORDER_PX;
        let center_x = clamp_axis(center_x, image.cols(), margin);
        let center_y = clamp_axis(center_y, image.rows(), margin);

        debug!(
            "Phantom ROI at ({}, {}), radius {} px (target {} px)",
            center_x, center_y, radius, target_radius
        );

        RoiMask::disk(
            image.rows(),
            image.cols(),
            center_x,
            center_y,
            radius,
            RoiMode::PhantomConstrained,
        )
        .with_notes(notes)
    }

    /// Noise ROI of a fixed area centered on the image
    ///
    /// The radius uses the average of the x and y spacings. No phantom
    /// detection is involved.
    pub fn fixed_central(
        &self,
        image: &Image,
        spacing: PixelSpacing,
        spec: &CentralRoiSpec,
    ) -> RoiMask {
        let mut notes = Vec::new();
        let radius = bound_radius(
            image,
            radius_for_area(spec.target_area_mm2) / spacing.average(),
            &mut notes,
        );

        let (cy, cx) = image.center();
        let margin = match spec.edge_margin_px {
            Some(m) => (radius.floor() + m as f64).max(radius + BORDER_PX),
            None => radius + BORDER_PX,
        };
        let center_x = clamp_axis(cx as f64, image.cols(), margin);
        let center_y = clamp_axis(cy as f64, image.rows(), margin);

        debug!(
            "Central ROI at ({}, {}), radius {:.1} px",
            center_x, center_y, radius
        );

        RoiMask::disk(
            image.rows(),
            image.cols(),
            center_x,
            center_y,
            radius,
            RoiMode::FixedCentral,
        )
        .with_notes(notes)
    }

    /// Small signal ROI centered on the brightest positive pixel
    ///
    /// Without any positive pixel the image center is kept. The center is
    /// held `floor(radius) + edge_margin_px` away from every edge.
    pub fn peak_seeking(&self, image: &Image, spacing: PixelSpacing, spec: &PeakRoiSpec) -> RoiMask {
        let mut notes = Vec::new();
        let radius = bound_radius(image, spec.radius_mm / spacing.average(), &mut notes);

        let (center_y, center_x) = match brightest_positive_pixel(image) {
            Some(peak) => peak,
            None => {
                warn!("Signal fallback: no phantom detected.");
                notes.push(RoiNote::PeakNotFound);
                image.center()
            }
        };

        let margin = (radius.floor() + spec.edge_margin_px as f64).max(radius + BORDER_PX);
        let center_x = clamp_axis(center_x as f64, image.cols(), margin);
        let center_y = clamp_axis(center_y as f64, image.rows(), margin);

        debug!(
            "Peak ROI at ({}, {}), radius {:.1} px",
            center_x, center_y, radius
        );

        RoiMask::disk(
            image.rows(),
            image.cols(),
            center_x,
            center_y,
            radius,
            RoiMode::PeakSeeking,
        )
        .with_notes(notes)
    }
}

/// First (raster order) position of the maximum among pixels `> 0`
fn brightest_positive_pixel(image: &Image) -> Option<(usize, usize)> {
    image
        .pixels()
        .indexed_iter()
        .filter(|(_, &v)| v > 0.0)
        .fold(None, |best: Option<((usize, usize), f64)>, (idx, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((idx, v)),
        })
        .map(|(idx, _)| idx)
}
