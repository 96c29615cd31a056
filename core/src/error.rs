use thiserror::Error;

/// Result type for phantom QA operations
pub type Result<T> = std::result::Result<T, QaError>;

/// Error types for phantom QA operations
#[derive(Error, Debug)]
pub enum QaError {
    /// DICOM container could not be read
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// Pixel data could not be decoded into an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// The weekly workflow was given no usable slices
    #[error("No candidate slices")]
    NoCandidateSlices,

    /// A mask selected no pixels of its image
    #[error("ROI selects no pixels")]
    EmptyRoi,

    /// Invalid workflow configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Overlay image could not be written
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<String> for QaError {
    fn from(s: String) -> Self {
        QaError::InvalidValue(s)
    }
}

impl From<&str> for QaError {
    fn from(s: &str) -> Self {
        QaError::InvalidValue(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for QaError {
    fn from(e: dicom_object::ReadError) -> Self {
        QaError::Dicom(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for QaError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        QaError::InvalidValue(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for QaError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        QaError::Decode(format!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message() {
        let err = QaError::Decode("unsupported transfer syntax".to_string());
        assert_eq!(err.to_string(), "Decode error: unsupported transfer syntax");
    }

    #[test]
    fn test_string_conversion() {
        let err: QaError = "bad spacing".into();
        assert!(matches!(err, QaError::InvalidValue(_)));
    }
}
