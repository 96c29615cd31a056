use super::{load_scan, measure};
use crate::classify::parse_nema_scan_id;
use crate::diagnostics::{Diagnostics, QaWarning};
use crate::discovery::{collect_dicom_files, list_subdirectories};
use crate::error::Result;
use crate::metrics::{piu, round_to, snr};
use crate::phantom::PhantomDetector;
use crate::render::RoiInspector;
use crate::roi::RoiBuilder;
use crate::source::ScanSource;
use crate::types::{NemaBodyConfig, Orientation, ScanKind};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// How the input directory was organised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum NemaLayout {
    /// One subfolder per scan, named after it
    Subfolders,
    /// Named DICOM files directly in the directory
    Files,
}

/// A scan to measure, identified from its folder or file name
#[derive(Debug, Clone, PartialEq)]
pub struct NemaEntry {
    pub scan_id: String,
    pub path: PathBuf,
    pub kind: ScanKind,
    pub orientation: Orientation,
}

/// One output row
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "PascalCase"))]
pub struct NemaRecord {
    #[cfg_attr(feature = "json", serde(rename = "ScanID"))]
    pub scan_id: String,
    #[cfg_attr(feature = "json", serde(serialize_with = "serialize_nema_label"))]
    pub orientation: Orientation,
    #[cfg_attr(feature = "json", serde(rename = "Type"))]
    pub kind: ScanKind,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    #[cfg_attr(feature = "json", serde(rename = "StDev"))]
    pub stdev: f64,
    pub filename: String,
    /// InstanceNumber, 1 when absent
    pub slice: i32,
    /// Set on the image row of a paired orientation
    #[cfg_attr(
        feature = "json",
        serde(rename = "SNR", skip_serializing_if = "Option::is_none")
    )]
    pub snr: Option<f64>,
    #[cfg_attr(
        feature = "json",
        serde(rename = "PIU", skip_serializing_if = "Option::is_none")
    )]
    pub piu: Option<f64>,
}

#[cfg(feature = "json")]
fn serialize_nema_label<S: serde::Serializer>(
    orientation: &Orientation,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(orientation.nema_label())
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct NemaBodyReport {
    pub layout: NemaLayout,
    /// Image rows first, then noise rows, each in discovery order
    pub records: Vec<NemaRecord>,
}

/// Multi-orientation NEMA body check
///
/// Image scans get a phantom-constrained ROI, noise scans a central one.
/// The first image and first noise scan of an orientation are paired for
/// SNR and PIU.
pub struct NemaBodyWorkflow<S> {
    source: S,
    config: NemaBodyConfig,
    builder: RoiBuilder,
}

impl<S: ScanSource> NemaBodyWorkflow<S> {
    pub fn new(source: S, config: NemaBodyConfig) -> Self {
        let builder = RoiBuilder::new(PhantomDetector::new(config.detector.clone()));
        Self {
            source,
            config,
            builder,
        }
    }

    /// Discovers and measures the scans of `directory`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a directory cannot be listed
    pub fn run_directory(
        &self,
        directory: &Path,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Result<NemaBodyReport> {
        let (layout, entries) = discover_entries(directory, diagnostics)?;
        info!("Found {} NEMA body scans ({:?} layout)", entries.len(), layout);
        Ok(NemaBodyReport {
            layout,
            records: self.run_entries(&entries, inspector, diagnostics),
        })
    }

    /// Measures every entry and pairs image and noise rows by orientation
    pub fn run_entries(
        &self,
        entries: &[NemaEntry],
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Vec<NemaRecord> {
        let mut images = Vec::new();
        let mut noises = Vec::new();
        for entry in entries {
            if let Some(record) = self.measure_entry(entry, inspector, diagnostics) {
                info!("Processed '{}' successfully.", entry.scan_id);
                match entry.kind {
                    ScanKind::Signal => images.push(record),
                    ScanKind::Noise => noises.push(record),
                }
            }
        }

        let mut paired: Vec<Orientation> = Vec::new();
        for image in images.iter_mut() {
            if paired.contains(&image.orientation) {
                continue;
            }
            paired.push(image.orientation);
            match noises.iter().find(|n| n.orientation == image.orientation) {
                Some(noise) => self.pair(image, noise),
                None => diagnostics.push(QaWarning::MissingPair {
                    subject: image.scan_id.clone(),
                    missing: "noise".to_string(),
                }),
            }
        }

        images.extend(noises);
        images
    }

    fn measure_entry(
        &self,
        entry: &NemaEntry,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Option<NemaRecord> {
        let scan = load_scan(&self.source, &entry.path, diagnostics)?;
        let spacing = scan.metadata.pixel_spacing;
        let roi = match entry.kind {
            ScanKind::Signal => self
                .builder
                .phantom_constrained(&scan.image, spacing, &self.config.signal_roi),
            ScanKind::Noise => self
                .builder
                .fixed_central(&scan.image, spacing, &self.config.noise_roi),
        };
        let label = format!("{}_{}", entry.scan_id, entry.kind);
        let stats = measure(&label, &entry.path, &scan.image, &roi, inspector, diagnostics)?
            .rounded(self.config.metric_decimals);

        Some(NemaRecord {
            scan_id: entry.scan_id.clone(),
            orientation: entry.orientation,
            kind: entry.kind,
            mean: stats.mean,
            min: stats.min,
            max: stats.max,
            sum: stats.sum,
            stdev: stats.stdev,
            filename: scan.metadata.file_name.clone(),
            slice: scan.metadata.instance_number.unwrap_or(1),
            snr: None,
            piu: None,
        })
    }

    /// SNR and PIU from the already rounded row values
    fn pair(&self, image: &mut NemaRecord, noise: &NemaRecord) {
        let decimals = self.config.ratio_decimals;
        image.snr = Some(round_to(snr(image.mean, noise.stdev, self.config.snr_scale), decimals));
        image.piu = Some(round_to(piu(image.max, image.min), decimals));
    }
}

/// Finds the scans of a NEMA body directory
///
/// With subfolders, each parsable subfolder contributes its first DICOM
/// file. Otherwise each parsable DICOM file in the directory is used.
///
/// # Errors
///
/// Returns an I/O error if a directory cannot be listed
pub fn discover_entries(directory: &Path, diagnostics: &mut Diagnostics) -> Result<(NemaLayout, Vec<NemaEntry>)> {
    let subfolders = list_subdirectories(directory)?;
    if subfolders.is_empty() {
        let entries = collect_dicom_files(directory)?
            .into_iter()
            .filter_map(|path| {
                let name = file_name(&path);
                parse_entry(name, path, diagnostics)
            })
            .collect();
        return Ok((NemaLayout::Files, entries));
    }

    let mut entries = Vec::new();
    for folder in subfolders {
        let name = file_name(&folder);
        let Some((kind, orientation)) = parse_nema_scan_id(&name) else {
            warn!("Subfolder '{}' does not follow expected naming. Skipping.", name);
            diagnostics.push(QaWarning::Unclassified { file: folder });
            continue;
        };
        match collect_dicom_files(&folder)?.into_iter().next() {
            Some(path) => entries.push(NemaEntry {
                scan_id: name,
                path,
                kind,
                orientation,
            }),
            None => warn!("No DICOM files found in {}. Skipping.", folder.display()),
        }
    }
    Ok((NemaLayout::Subfolders, entries))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_entry(name: String, path: PathBuf, diagnostics: &mut Diagnostics) -> Option<NemaEntry> {
    match parse_nema_scan_id(&name) {
        Some((kind, orientation)) => Some(NemaEntry {
            scan_id: name,
            path,
            kind,
            orientation,
        }),
        None => {
            warn!("File '{}' does not follow expected naming. Skipping.", name);
            diagnostics.push(QaWarning::Unclassified { file: path });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScanMetadata;
    use crate::source::InMemorySource;
    use crate::types::Image;
    use crate::workflow::fixtures::{disk_image, noise_image};
    use std::fs::File;
    use tempfile::TempDir;

    fn entry(scan_id: &str, kind: ScanKind, orientation: Orientation) -> NemaEntry {
        NemaEntry {
            scan_id: scan_id.to_string(),
            path: PathBuf::from(format!("/in/{}.dcm", scan_id)),
            kind,
            orientation,
        }
    }

    fn source_for(entries: &[(&NemaEntry, Image)]) -> InMemorySource {
        let mut source = InMemorySource::new();
        for (entry, image) in entries {
            let metadata = ScanMetadata {
                instance_number: Some(7),
                ..Default::default()
            };
            source.insert(entry.path.clone(), metadata, image.clone());
        }
        source
    }

    #[test]
    fn test_pairs_image_and_noise_by_orientation() {
        let sag_image = entry("sag_image", ScanKind::Signal, Orientation::Sagittal);
        let sag_noise = entry("sag_noise", ScanKind::Noise, Orientation::Sagittal);
        let cor_image = entry("cor_image", ScanKind::Signal, Orientation::Coronal);
        let source = source_for(&[
            (&sag_image, disk_image(256, 256, 128.0, 128.0, 110.0, 1000.0)),
            (&sag_noise, noise_image(256, 256, 5.0)),
            (&cor_image, disk_image(256, 256, 128.0, 128.0, 110.0, 800.0)),
        ]);
        let mut diagnostics = Diagnostics::new();

        let records = NemaBodyWorkflow::new(&source, NemaBodyConfig::default()).run_entries(
            &[sag_noise.clone(), sag_image.clone(), cor_image.clone()],
            &mut (),
            &mut diagnostics,
        );

        let ids: Vec<&str> = records.iter().map(|r| r.scan_id.as_str()).collect();
        assert_eq!(ids, vec!["sag_image", "cor_image", "sag_noise"]);

        let sag = &records[0];
        assert_eq!(sag.mean, 1000.0);
        assert_eq!(sag.slice, 7);
        assert_eq!(sag.filename, "sag_image.dcm");
        // 0.66 * 1000 / 5
        assert_eq!(sag.snr, Some(132.0));
        assert_eq!(sag.piu, Some(100.0));

        assert_eq!(records[1].snr, None);
        assert_eq!(records[2].stdev, 5.0);
        assert_eq!(records[2].snr, None);

        assert!(matches!(
            diagnostics.warnings(),
            [QaWarning::MissingPair { subject, .. }] if subject == "cor_image"
        ));
    }

    #[test]
    fn test_only_first_image_of_orientation_paired() {
        let first = entry("tra_image_1", ScanKind::Signal, Orientation::Transverse);
        let second = entry("tra_image_2", ScanKind::Signal, Orientation::Transverse);
        let noise = entry("tra_noise", ScanKind::Noise, Orientation::Transverse);
        let phantom = disk_image(256, 256, 128.0, 128.0, 110.0, 600.0);
        let source = source_for(&[
            (&first, phantom.clone()),
            (&second, phantom),
            (&noise, noise_image(256, 256, 3.0)),
        ]);
        let mut diagnostics = Diagnostics::new();

        let records = NemaBodyWorkflow::new(&source, NemaBodyConfig::default()).run_entries(
            &[first, second, noise],
            &mut (),
            &mut diagnostics,
        );

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].snr, Some(132.0));
        assert_eq!(records[1].snr, None);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_zero_noise_gives_zero_snr() {
        let image = entry("sag_image", ScanKind::Signal, Orientation::Sagittal);
        let noise = entry("sag_noise", ScanKind::Noise, Orientation::Sagittal);
        let source = source_for(&[
            (&image, disk_image(256, 256, 128.0, 128.0, 110.0, 1000.0)),
            (&noise, Image::new(ndarray::Array2::zeros((256, 256)))),
        ]);
        let mut diagnostics = Diagnostics::new();

        let records = NemaBodyWorkflow::new(&source, NemaBodyConfig::default()).run_entries(
            &[image, noise],
            &mut (),
            &mut diagnostics,
        );
        assert_eq!(records[0].snr, Some(0.0));
    }

    #[test]
    fn test_discover_subfolders() {
        let temp_dir = TempDir::new().unwrap();
        for folder in ["SAG_image", "sag_noise", "localizer", "cor_image_empty"] {
            std::fs::create_dir(temp_dir.path().join(folder)).unwrap();
        }
        File::create(temp_dir.path().join("SAG_image").join("2.dcm")).unwrap();
        File::create(temp_dir.path().join("SAG_image").join("1.dcm")).unwrap();
        File::create(temp_dir.path().join("sag_noise").join("1.dcm")).unwrap();
        File::create(temp_dir.path().join("localizer").join("1.dcm")).unwrap();
        let mut diagnostics = Diagnostics::new();

        let (layout, entries) =
            discover_entries(temp_dir.path(), &mut diagnostics).unwrap();

        assert_eq!(layout, NemaLayout::Subfolders);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].scan_id, "SAG_image");
        assert_eq!(entries[0].path, temp_dir.path().join("SAG_image").join("1.dcm"));
        assert_eq!(entries[0].kind, ScanKind::Signal);
        assert_eq!(entries[1].kind, ScanKind::Noise);
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_discover_flat_files() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["tra_image.dcm", "tans_noise.dcm", "scout.dcm", "readme.txt"] {
            File::create(temp_dir.path().join(name)).unwrap();
        }
        let mut diagnostics = Diagnostics::new();

        let (layout, entries) =
            discover_entries(temp_dir.path(), &mut diagnostics).unwrap();

        assert_eq!(layout, NemaLayout::Files);
        let ids: Vec<&str> = entries.iter().map(|e| e.scan_id.as_str()).collect();
        assert_eq!(ids, vec!["tans_noise.dcm", "tra_image.dcm"]);
        assert!(entries
            .iter()
            .all(|e| e.orientation == Orientation::Transverse));
        assert!(matches!(
            diagnostics.warnings(),
            [QaWarning::Unclassified { .. }]
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_record_serializes_with_report_columns() {
        let mut record = NemaRecord {
            scan_id: "sag_image".to_string(),
            orientation: Orientation::Sagittal,
            kind: ScanKind::Signal,
            mean: 1000.0,
            min: 990.0,
            max: 1010.0,
            sum: 34_000_000.0,
            stdev: 3.5,
            filename: "IM_0001.dcm".to_string(),
            slice: 7,
            snr: Some(132.0),
            piu: Some(99.01),
        };
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "ScanID", "Orientation", "Type", "Mean", "Min", "Max", "Sum", "StDev", "Filename",
            "Slice", "SNR", "PIU",
        ] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(keys.len(), 12);
        assert_eq!(value["Orientation"], "Sagi");
        assert_eq!(value["Type"], "image");
        assert_eq!(value["Slice"], 7);
        assert_eq!(value["SNR"], 132.0);

        record.orientation = Orientation::Transverse;
        record.kind = ScanKind::Noise;
        record.snr = None;
        record.piu = None;
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Orientation"], "Trans");
        assert_eq!(value["Type"], "noise");
        assert!(value.get("SNR").is_none());
        assert!(value.get("PIU").is_none());
    }
}
