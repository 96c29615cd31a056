use crate::types::ImageType;
use dicom_object::InMemDicomObject;

use super::tags::{get_multi_string_value, IMAGE_TYPE};

/// Extracts ImageType structure from DICOM file
///
/// A missing tag yields an empty ImageType, which never carries the NORM flag.
pub fn extract_image_type(dcm: &InMemDicomObject) -> ImageType {
    get_multi_string_value(dcm, IMAGE_TYPE)
        .map(|values| ImageType::from_values(&values))
        .unwrap_or_default()
}
