use crate::extraction::tags::{
    get_f64_value, get_int_value, get_string_value, get_u16_value, COLUMNS, INSTANCE_NUMBER, ROWS,
    SERIES_DESCRIPTION, SLICE_LOCATION,
};
use crate::extraction::{
    extract_coil_labels, extract_image_type, extract_pixel_spacing, extract_rescale,
};
use crate::types::{ImageType, PixelSpacing};
use dicom_object::InMemDicomObject;
use std::path::Path;

/// Extractor for the header fields the QA workflows consume
///
/// # Example
///
/// ```
/// use phantomqa_core::ScanMetadataExtractor;
/// use dicom_object::InMemDicomObject;
/// use dicom_core::{DataElement, PrimitiveValue, VR, Tag};
///
/// let mut dcm = InMemDicomObject::new_empty();
/// dcm.put(DataElement::new(
///     Tag(0x0008, 0x103E), // SeriesDescription
///     VR::LO,
///     PrimitiveValue::from("t1_se_tra_NOISE"),
/// ));
/// dcm.put(DataElement::new(
///     Tag(0x0051, 0x100F), // coil element string
///     VR::LO,
///     PrimitiveValue::from("VAS1"),
/// ));
///
/// let metadata = ScanMetadataExtractor::extract(&dcm, "noise_vas1.dcm");
///
/// assert_eq!(metadata.series_description, "t1_se_tra_noise");
/// assert_eq!(metadata.coil_labels, vec!["VAS1".to_string()]);
/// assert_eq!(metadata.pixel_spacing.x, 1.0);
/// assert_eq!(metadata.slice_location, None);
/// ```
pub struct ScanMetadataExtractor;

impl ScanMetadataExtractor {
    /// Extracts all fields at once; absent tags take their documented defaults
    pub fn extract(dcm: &InMemDicomObject, file_name: impl Into<String>) -> ScanMetadata {
        ScanMetadata {
            file_name: file_name.into(),
            series_description: get_string_value(dcm, SERIES_DESCRIPTION)
                .unwrap_or_default()
                .to_lowercase(),
            image_type: extract_image_type(dcm),
            coil_labels: extract_coil_labels(dcm),
            pixel_spacing: extract_pixel_spacing(dcm),
            rescale: extract_rescale(dcm),
            slice_location: get_f64_value(dcm, SLICE_LOCATION),
            instance_number: get_int_value(dcm, INSTANCE_NUMBER),
            rows: get_u16_value(dcm, ROWS),
            columns: get_u16_value(dcm, COLUMNS),
        }
    }

    /// Same as [`extract`](Self::extract), naming the scan after the path's file name
    pub fn extract_for_path(dcm: &InMemDicomObject, path: &Path) -> ScanMetadata {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::extract(dcm, file_name)
    }
}

/// Header fields of one scan
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ScanMetadata {
    /// File name without directory
    pub file_name: String,

    /// SeriesDescription, lowercased; empty when absent
    pub series_description: String,

    /// Parsed ImageType field
    pub image_type: ImageType,

    /// Labels from the private coil element tag (0051,100F)
    pub coil_labels: Vec<String>,

    /// Defaults to 1.0 x 1.0 mm
    pub pixel_spacing: PixelSpacing,

    /// `(slope, intercept)` when both tags are present
    pub rescale: Option<(f64, f64)>,

    pub slice_location: Option<f64>,

    pub instance_number: Option<i32>,

    pub rows: Option<u16>,

    pub columns: Option<u16>,
}

impl ScanMetadata {
    /// Whether the NORM flag is set in ImageType
    pub fn is_normalized(&self) -> bool {
        self.image_type.is_normalized()
    }
}
