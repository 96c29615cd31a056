//! Image-quality metrics for MRI phantom scans
//!
//! Three workflows share one measurement pipeline: read a scan, locate the
//! phantom, place a region of interest and summarize the pixels inside it.
//!
//! - [`WeeklyWorkflow`]: SNR and uniformity of the slice nearest isocenter
//! - [`NemaBodyWorkflow`]: paired image/noise scans per orientation
//! - [`TorsoWorkflow`]: combined views and individual coil elements

pub mod api;
pub mod classify;
pub mod cli;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod extraction;
pub mod metrics;
pub mod phantom;
pub mod render;
pub mod roi;
pub mod selection;
pub mod source;
pub mod types;
pub mod workflow;

pub use api::{ScanMetadata, ScanMetadataExtractor};
pub use classify::{ClassifiedFiles, FileRole};
pub use cli::report::TextReport;
pub use diagnostics::{Diagnostics, QaWarning};
pub use error::{QaError, Result};
pub use metrics::RoiStats;
pub use phantom::{PhantomDetector, PhantomGeometry};
pub use render::{OverlayWriter, RoiInspector};
pub use roi::{RoiBuilder, RoiMask, RoiMode};
pub use source::{DicomFileSource, InMemorySource, Scan, ScanSource};
pub use types::*;
pub use workflow::{
    NemaBodyReport, NemaBodyWorkflow, TorsoReport, TorsoWorkflow, WeeklyReport, WeeklyWorkflow,
};
