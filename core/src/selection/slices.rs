use crate::error::{QaError, Result};
use crate::selection::candidate::SliceCandidate;

/// Picks the representative slice of a series
///
/// The minimum under [`SliceCandidate`]'s ordering wins; among exact ties the
/// first candidate is kept.
///
/// # Errors
///
/// Returns [`QaError::NoCandidateSlices`] if `candidates` is empty
///
/// # Example
///
/// ```
/// use phantomqa_core::selection::{select_best_slice, SliceCandidate};
/// use std::path::PathBuf;
///
/// let candidates = vec![
///     SliceCandidate {
///         file_path: PathBuf::from("s1.dcm"),
///         slice_location: Some(-20.0),
///         instance_number: Some(1),
///         mean_intensity: 300.0,
///     },
///     SliceCandidate {
///         file_path: PathBuf::from("s2.dcm"),
///         slice_location: Some(0.5),
///         instance_number: Some(2),
///         mean_intensity: 250.0,
///     },
/// ];
///
/// let best = select_best_slice(&candidates).unwrap();
/// assert_eq!(best.file_path, PathBuf::from("s2.dcm"));
/// ```
pub fn select_best_slice(candidates: &[SliceCandidate]) -> Result<&SliceCandidate> {
    candidates
        .iter()
        .reduce(|best, c| if c < best { c } else { best })
        .ok_or(QaError::NoCandidateSlices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_set_is_error() {
        assert!(matches!(select_best_slice(&[]), Err(QaError::NoCandidateSlices)));
    }

    #[test]
    fn test_first_of_equal_candidates_kept() {
        let make = |name: &str| SliceCandidate {
            file_path: PathBuf::from(name),
            slice_location: Some(1.0),
            instance_number: None,
            mean_intensity: 50.0,
        };
        let candidates = vec![make("first.dcm"), make("second.dcm")];
        assert_eq!(
            select_best_slice(&candidates).unwrap().file_path,
            PathBuf::from("first.dcm")
        );
    }
}
