//! Assigns each scan its role in a QA workflow
//!
//! Torso scans are classified from header metadata by an ordered rule
//! table (first match wins). NEMA body scans are classified from their file
//! or folder name.

use crate::api::ScanMetadata;
use crate::types::{CoilElement, Orientation, ScanKind};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Role of a scan within the torso coil check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// All-element acquisition of one orientation
    Combined {
        orientation: Orientation,
        kind: ScanKind,
        is_norm: bool,
    },
    /// Single-element acquisition
    Individual {
        element: CoilElement,
        kind: ScanKind,
    },
    Unclassified,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRole::Combined {
                orientation,
                kind,
                is_norm,
            } => write!(f, "combined {} {} (norm={})", orientation, kind, is_norm),
            FileRole::Individual { element, kind } => write!(f, "individual {} {}", element, kind),
            FileRole::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// The header facts classification looks at, independent of file I/O
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifierInput {
    /// Lowercased SeriesDescription
    pub series_description: String,
    /// Path or name of the file, used for the "noise" hint
    pub file_name: String,
    pub coil_labels: Vec<String>,
    pub is_norm: bool,
}

impl ClassifierInput {
    pub fn from_metadata(path: &Path, metadata: &ScanMetadata) -> Self {
        Self {
            series_description: metadata.series_description.to_lowercase(),
            file_name: path.to_string_lossy().into_owned(),
            coil_labels: metadata.coil_labels.clone(),
            is_norm: metadata.is_normalized(),
        }
    }

    fn kind(&self) -> ScanKind {
        ScanKind::from_hints(&self.series_description, &self.file_name)
    }
}

/// One entry of the classification table
pub struct ClassificationRule {
    pub name: &'static str,
    pub apply: fn(&ClassifierInput) -> Option<FileRole>,
}

/// Orientation substrings searched in the series description, in order
const ORIENTATION_HINTS: [(&str, Orientation); 3] = [
    ("tra", Orientation::Transverse),
    ("sag", Orientation::Sagittal),
    ("cor", Orientation::Coronal),
];

/// Torso rules in precedence order
///
/// The element rule must come first: element scans may also carry an
/// orientation substring in their description.
pub const TORSO_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "single coil element",
        apply: individual_element_rule,
    },
    ClassificationRule {
        name: "combined orientation",
        apply: combined_orientation_rule,
    },
];

fn individual_element_rule(input: &ClassifierInput) -> Option<FileRole> {
    match input.coil_labels.as_slice() {
        [label] => CoilElement::from_label(label).map(|element| FileRole::Individual {
            element,
            kind: input.kind(),
        }),
        _ => None,
    }
}

fn combined_orientation_rule(input: &ClassifierInput) -> Option<FileRole> {
    ORIENTATION_HINTS
        .iter()
        .find(|(hint, _)| input.series_description.contains(hint))
        .map(|&(_, orientation)| FileRole::Combined {
            orientation,
            kind: input.kind(),
            is_norm: input.is_norm,
        })
}

/// Applies [`TORSO_RULES`] and returns the first matching role
pub fn classify(input: &ClassifierInput) -> FileRole {
    TORSO_RULES
        .iter()
        .find_map(|rule| {
            (rule.apply)(input).inspect(|role| debug!("Rule '{}' -> {}", rule.name, role))
        })
        .unwrap_or(FileRole::Unclassified)
}

/// Key of a combined-view scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinedKey {
    pub orientation: Orientation,
    pub kind: ScanKind,
    pub is_norm: bool,
}

/// Key of a single-element scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey {
    pub element: CoilElement,
    pub kind: ScanKind,
}

/// Torso scans bucketed by role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedFiles {
    pub combined: BTreeMap<CombinedKey, PathBuf>,
    pub individual: BTreeMap<ElementKey, PathBuf>,
    pub unclassified: Vec<PathBuf>,
    /// Files whose role was already taken by an earlier file
    pub duplicates: Vec<(PathBuf, FileRole)>,
}

impl ClassifiedFiles {
    /// Buckets `(path, metadata)` pairs; the first file for a role wins
    pub fn from_scans<'a>(scans: impl IntoIterator<Item = (&'a Path, &'a ScanMetadata)>) -> Self {
        let mut classified = Self::default();
        for (path, metadata) in scans {
            let role = classify(&ClassifierInput::from_metadata(path, metadata));
            classified.insert(path, role);
        }
        classified
    }

    fn insert(&mut self, path: &Path, role: FileRole) {
        let taken = match role {
            FileRole::Combined {
                orientation,
                kind,
                is_norm,
            } => {
                let key = CombinedKey {
                    orientation,
                    kind,
                    is_norm,
                };
                insert_first(&mut self.combined, key, path)
            }
            FileRole::Individual { element, kind } => {
                insert_first(&mut self.individual, ElementKey { element, kind }, path)
            }
            FileRole::Unclassified => {
                debug!("Unclassified file: {}", path.display());
                self.unclassified.push(path.to_path_buf());
                return;
            }
        };

        if taken {
            debug!("{} duplicates role {}, ignoring", path.display(), role);
            self.duplicates.push((path.to_path_buf(), role));
        } else {
            debug!("{} -> {}", path.display(), role);
        }
    }

    pub fn combined_file(&self, orientation: Orientation, kind: ScanKind, is_norm: bool) -> Option<&Path> {
        self.combined
            .get(&CombinedKey {
                orientation,
                kind,
                is_norm,
            })
            .map(PathBuf::as_path)
    }

    pub fn element_file(&self, element: CoilElement, kind: ScanKind) -> Option<&Path> {
        self.individual
            .get(&ElementKey { element, kind })
            .map(PathBuf::as_path)
    }
}

/// Returns true if the key was already present
///
/// Callers pass files in sorted order, so a role belongs to the first file
/// that claims it; the existing entry is never replaced.
fn insert_first<K: Ord>(map: &mut BTreeMap<K, PathBuf>, key: K, path: &Path) -> bool {
    if map.contains_key(&key) {
        true
    } else {
        map.insert(key, path.to_path_buf());
        false
    }
}

/// Parses a NEMA body scan id (folder or file name) into type and orientation
///
/// Type is `noise` if the name contains "noise", else `image` if it contains
/// "image". Orientation is checked in the order sag, cor, tra/tans.
pub fn parse_nema_scan_id(name: &str) -> Option<(ScanKind, Orientation)> {
    let s = name.to_lowercase();

    let kind = if s.contains("noise") {
        ScanKind::Noise
    } else if s.contains("image") {
        ScanKind::Signal
    } else {
        return None;
    };

    let orientation = if s.contains("sag") {
        Orientation::Sagittal
    } else if s.contains("cor") {
        Orientation::Coronal
    } else if s.contains("tra") || s.contains("tans") {
        Orientation::Transverse
    } else {
        return None;
    };

    debug!("Parsed '{}' as {} {}", name, kind, orientation.nema_label());
    Some((kind, orientation))
}
