use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Core Image Tags
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);

// Image Geometry Tags
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const SLICE_LOCATION: Tag = Tag(0x0020, 0x1041);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// Modality LUT Tags
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);

// Description Tags
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);

// Siemens private coil element string (semicolon separated labels)
pub const COIL_ELEMENT: Tag = Tag(0x0051, 0x100F);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get a floating point value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to f64
pub fn get_f64_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
}

/// Helper to get multi-string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to Vec<String>
pub fn get_multi_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<String>> {
    dcm.element(tag).ok().and_then(|elem| {
        if let Ok(strs) = elem.to_multi_str() {
            Some(strs.iter().map(|s| s.trim().to_string()).collect())
        } else {
            // Fallback: try to get as single string and split by backslash
            elem.to_str()
                .ok()
                .map(|s| s.split('\\').map(|part| part.trim().to_string()).collect())
        }
    })
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_tag_values() {
        assert_eq!(IMAGE_TYPE, Tag(0x0008, 0x0008));
        assert_eq!(SLICE_LOCATION, Tag(0x0020, 0x1041));
        assert_eq!(COIL_ELEMENT, Tag(0x0051, 0x100F));
        assert_eq!(PIXEL_SPACING, Tag(0x0028, 0x0030));
    }

    #[test]
    fn test_get_f64_value() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SLICE_LOCATION,
            VR::DS,
            PrimitiveValue::from("-12.5"),
        ));
        assert_eq!(get_f64_value(&dcm, SLICE_LOCATION), Some(-12.5));
        assert_eq!(get_f64_value(&dcm, RESCALE_SLOPE), None);
    }

    #[test]
    fn test_get_string_value_trims() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SERIES_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from(" SAG noise "),
        ));
        assert_eq!(
            get_string_value(&dcm, SERIES_DESCRIPTION).as_deref(),
            Some("SAG noise")
        );
    }
}
