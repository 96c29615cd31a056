//! Structured record of the non-fatal conditions met during a run

use crate::roi::{RoiMask, RoiNote};
use log::warn;
use std::fmt;
use std::path::{Path, PathBuf};

/// A condition that degraded or skipped part of a run without aborting it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "snake_case"))]
pub enum QaWarning {
    /// Segmentation failed; fallback geometry was used
    PhantomNotDetected { file: PathBuf },
    /// ROI radius forced to 1 px
    DegenerateRoi { file: PathBuf },
    /// Peak-seeking ROI found no positive pixel
    PeakNotFound { file: PathBuf },
    /// ROI radius reduced to fit the image
    RoiClamped { file: PathBuf },
    /// Mask selected no pixel; the record was omitted
    EmptyRoi { file: PathBuf },
    /// File could not be read or decoded
    Skipped { file: PathBuf, reason: String },
    /// File matched no classification rule or naming pattern
    Unclassified { file: PathBuf },
    /// Another file already holds the same role
    DuplicateRole { file: PathBuf, role: String },
    /// Signal or noise counterpart absent
    MissingPair { subject: String, missing: String },
    /// No NORM signal image for a combined orientation
    MissingNormalized { subject: String },
}

impl fmt::Display for QaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QaWarning::PhantomNotDetected { file } => {
                write!(f, "{}: no phantom detected, using image center", file.display())
            }
            QaWarning::DegenerateRoi { file } => {
                write!(f, "{}: ROI radius below 1 px, forced to 1 px", file.display())
            }
            QaWarning::PeakNotFound { file } => {
                write!(f, "{}: no positive pixel, peak ROI kept at center", file.display())
            }
            QaWarning::RoiClamped { file } => {
                write!(f, "{}: ROI radius reduced to fit the image", file.display())
            }
            QaWarning::EmptyRoi { file } => {
                write!(f, "{}: ROI selects no pixels, record omitted", file.display())
            }
            QaWarning::Skipped { file, reason } => {
                write!(f, "{}: skipped ({})", file.display(), reason)
            }
            QaWarning::Unclassified { file } => write!(f, "{}: unclassified", file.display()),
            QaWarning::DuplicateRole { file, role } => {
                write!(f, "{}: duplicate {}, ignored", file.display(), role)
            }
            QaWarning::MissingPair { subject, missing } => {
                write!(f, "{}: no {} scan, skipped", subject, missing)
            }
            QaWarning::MissingNormalized { subject } => {
                write!(f, "{}: no normalized image, uniformity set to 0", subject)
            }
        }
    }
}

/// Collector passed through a workflow run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<QaWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and logs it
    pub fn push(&mut self, warning: QaWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Records the notes attached to a mask built from `file`
    ///
    /// The ROI builder has already logged these, so they are stored only.
    pub fn record_roi(&mut self, file: &Path, roi: &RoiMask) {
        for note in &roi.notes {
            let file = file.to_path_buf();
            self.warnings.push(match note {
                RoiNote::PhantomNotDetected => QaWarning::PhantomNotDetected { file },
                RoiNote::DegenerateRadius => QaWarning::DegenerateRoi { file },
                RoiNote::PeakNotFound => QaWarning::PeakNotFound { file },
                RoiNote::RadiusClamped => QaWarning::RoiClamped { file },
            });
        }
    }

    pub fn skipped(&mut self, file: &Path, reason: impl fmt::Display) {
        self.push(QaWarning::Skipped {
            file: file.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    pub fn warnings(&self) -> &[QaWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
