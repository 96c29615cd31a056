use dicom_object::InMemDicomObject;

use super::tags::{get_string_value, COIL_ELEMENT};

/// Extracts the receive coil labels from the private coil element tag
///
/// Returns an empty list when the tag is absent.
pub fn extract_coil_labels(dcm: &InMemDicomObject) -> Vec<String> {
    get_string_value(dcm, COIL_ELEMENT)
        .map(|raw| split_coil_labels(&raw))
        .unwrap_or_default()
}

/// Splits a semicolon separated label list, dropping blank entries
pub fn split_coil_labels(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_split_coil_labels() {
        assert_eq!(split_coil_labels("VAS1"), vec!["VAS1"]);
        assert_eq!(split_coil_labels("BO1;BO2; ;SP3;"), vec!["BO1", "BO2", "SP3"]);
        assert!(split_coil_labels(" ; ").is_empty());
    }

    #[test]
    fn test_extract_coil_labels() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            COIL_ELEMENT,
            VR::LO,
            PrimitiveValue::from("VAP2"),
        ));
        assert_eq!(extract_coil_labels(&dcm), vec!["VAP2"]);
        assert!(extract_coil_labels(&InMemDicomObject::new_empty()).is_empty());
    }
}
