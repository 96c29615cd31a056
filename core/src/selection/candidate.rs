use crate::source::Scan;
use std::cmp::Ordering;
use std::path::PathBuf;

/// One slice competing to represent its series in the weekly check
#[derive(Debug, Clone)]
pub struct SliceCandidate {
    /// Path to the DICOM file
    pub file_path: PathBuf,

    /// SliceLocation in mm, if present
    pub slice_location: Option<f64>,

    /// InstanceNumber, if present
    pub instance_number: Option<i32>,

    /// Mean intensity over the whole frame
    pub mean_intensity: f64,
}

impl SliceCandidate {
    pub fn from_scan(scan: &Scan) -> Self {
        Self {
            file_path: scan.path.clone(),
            slice_location: scan.metadata.slice_location,
            instance_number: scan.metadata.instance_number,
            mean_intensity: scan.image.mean(),
        }
    }

    /// Distance from isocenter; a missing location sorts last
    pub fn distance_from_isocenter(&self) -> f64 {
        self.slice_location.map_or(f64::INFINITY, f64::abs)
    }

    /// Checks if this slice is preferred over another
    ///
    /// Priority order:
    /// 1. Smaller absolute SliceLocation
    /// 2. Higher mean intensity
    pub fn is_preferred_to(&self, other: &SliceCandidate) -> bool {
        self.cmp(other) == Ordering::Less
    }
}

impl PartialEq for SliceCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SliceCandidate {}

impl PartialOrd for SliceCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SliceCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_from_isocenter()
            .total_cmp(&other.distance_from_isocenter())
            .then_with(|| other.mean_intensity.total_cmp(&self.mean_intensity))
    }
}
