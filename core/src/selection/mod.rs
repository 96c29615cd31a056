//! Representative slice selection
//!
//! Chooses the single slice of a series used by the weekly check.

mod candidate;
mod slices;

pub use candidate::SliceCandidate;
pub use slices::select_best_slice;
