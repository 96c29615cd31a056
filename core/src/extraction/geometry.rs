use crate::types::PixelSpacing;
use dicom_object::InMemDicomObject;

use super::tags::{get_f64_value, get_string_value, PIXEL_SPACING, RESCALE_INTERCEPT, RESCALE_SLOPE};

/// Extracts PixelSpacing, defaulting to 1.0 x 1.0 mm
pub fn extract_pixel_spacing(dcm: &InMemDicomObject) -> PixelSpacing {
    let values = dcm
        .element(PIXEL_SPACING)
        .ok()
        .and_then(|elem| elem.to_multi_float64().ok());

    match values {
        Some(values) => PixelSpacing::from_values(&values),
        None => get_string_value(dcm, PIXEL_SPACING)
            .and_then(|raw| PixelSpacing::parse(&raw).ok())
            .map(|ps| PixelSpacing::from_values(&[ps.x, ps.y]))
            .unwrap_or_default(),
    }
}

/// Extracts the modality rescale as `(slope, intercept)`
///
/// Only applied when both tags are present, otherwise `None`.
pub fn extract_rescale(dcm: &InMemDicomObject) -> Option<(f64, f64)> {
    let slope = get_f64_value(dcm, RESCALE_SLOPE)?;
    let intercept = get_f64_value(dcm, RESCALE_INTERCEPT)?;
    Some((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_pixel_spacing_from_tag() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::from("0.5\\0.75"),
        ));
        assert_eq!(extract_pixel_spacing(&dcm), PixelSpacing::new(0.5, 0.75));
    }

    #[test]
    fn test_pixel_spacing_default() {
        let dcm = InMemDicomObject::new_empty();
        assert_eq!(extract_pixel_spacing(&dcm), PixelSpacing::default());
    }

    #[test]
    fn test_rescale_requires_both_tags() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            RESCALE_SLOPE,
            VR::DS,
            PrimitiveValue::from("2"),
        ));
        assert_eq!(extract_rescale(&dcm), None);

        dcm.put(DataElement::new(
            RESCALE_INTERCEPT,
            VR::DS,
            PrimitiveValue::from("-10"),
        ));
        assert_eq!(extract_rescale(&dcm), Some((2.0, -10.0)));
    }
}
