use super::{load_scan, measure};
use crate::classify::ClassifiedFiles;
use crate::diagnostics::{Diagnostics, QaWarning};
use crate::discovery::collect_dicom_files_recursive;
use crate::error::Result;
use crate::metrics::{piu, round_to, snr, RoiStats};
use crate::phantom::PhantomDetector;
use crate::render::RoiInspector;
use crate::roi::{RoiBuilder, RoiMask};
use crate::source::{Scan, ScanSource};
use crate::types::{CoilElement, Orientation, ScanKind, TorsoConfig};
use log::{error, info};
use std::path::{Path, PathBuf};

/// Result for one combined-coil orientation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CombinedRecord {
    /// "SAG", "TRA" or "COR"
    #[cfg_attr(feature = "json", serde(rename = "Region"))]
    pub region: String,
    /// Statistics of the normalized image, 0 when it is missing
    #[cfg_attr(feature = "json", serde(rename = "Signal Max"))]
    pub signal_max: f64,
    #[cfg_attr(feature = "json", serde(rename = "Signal Min"))]
    pub signal_min: f64,
    #[cfg_attr(feature = "json", serde(rename = "Signal Mean"))]
    pub signal_mean: f64,
    #[cfg_attr(feature = "json", serde(rename = "Noise SD"))]
    pub noise_sd: f64,
    #[cfg_attr(feature = "json", serde(rename = "SNR"))]
    pub snr: f64,
    #[cfg_attr(feature = "json", serde(rename = "Uniformity"))]
    pub uniformity: f64,
}

/// Result for one coil element
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ElementRecord {
    #[cfg_attr(feature = "json", serde(rename = "Element"))]
    pub element: CoilElement,
    #[cfg_attr(feature = "json", serde(rename = "Signal Mean"))]
    pub signal_mean: f64,
    #[cfg_attr(feature = "json", serde(rename = "Noise SD"))]
    pub noise_sd: f64,
    #[cfg_attr(feature = "json", serde(rename = "SNR"))]
    pub snr: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TorsoReport {
    /// In SAG, TRA, COR order
    pub combined: Vec<CombinedRecord>,
    /// In canonical element order
    pub elements: Vec<ElementRecord>,
}

/// Torso coil check over combined views and individual elements
pub struct TorsoWorkflow<S> {
    source: S,
    config: TorsoConfig,
    builder: RoiBuilder,
}

impl<S: ScanSource> TorsoWorkflow<S> {
    pub fn new(source: S, config: TorsoConfig) -> Self {
        let builder = RoiBuilder::new(PhantomDetector::new(config.detector.clone()));
        Self {
            source,
            config,
            builder,
        }
    }

    /// Runs over every DICOM file below `directory`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a directory cannot be listed
    pub fn run_directory(
        &self,
        directory: &Path,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Result<TorsoReport> {
        let files = collect_dicom_files_recursive(directory)?;
        if files.is_empty() {
            info!("No DICOM files found in folder.");
        }
        Ok(self.run(&files, inspector, diagnostics))
    }

    /// Classifies `files` from their headers, then measures every complete pair
    pub fn run(
        &self,
        files: &[PathBuf],
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> TorsoReport {
        let classified = self.classify(files, diagnostics);
        info!(
            "Classified {} combined and {} individual files",
            classified.combined.len(),
            classified.individual.len()
        );

        let combined = Orientation::TORSO_ORDER
            .iter()
            .filter_map(|&o| self.process_orientation(&classified, o, inspector, diagnostics))
            .collect();
        let elements = CoilElement::ALL
            .iter()
            .filter_map(|&e| self.process_element(&classified, e, inspector, diagnostics))
            .collect();

        TorsoReport { combined, elements }
    }

    fn classify(&self, files: &[PathBuf], diagnostics: &mut Diagnostics) -> ClassifiedFiles {
        let mut headers = Vec::new();
        for path in files {
            match self.source.read_header(path) {
                Ok(metadata) => headers.push((path.as_path(), metadata)),
                Err(e) => {
                    error!("Error reading {}: {}", path.display(), e);
                    diagnostics.skipped(path, e);
                }
            }
        }

        let classified = ClassifiedFiles::from_scans(headers.iter().map(|(p, m)| (*p, m)));
        for file in &classified.unclassified {
            diagnostics.push(QaWarning::Unclassified { file: file.clone() });
        }
        for (file, role) in &classified.duplicates {
            diagnostics.push(QaWarning::DuplicateRole {
                file: file.clone(),
                role: role.to_string(),
            });
        }
        classified
    }

    fn process_orientation(
        &self,
        classified: &ClassifiedFiles,
        orientation: Orientation,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Option<CombinedRecord> {
        let region = orientation.region_label();
        let signal_path = require(
            classified.combined_file(orientation, ScanKind::Signal, false),
            region,
            "signal",
            diagnostics,
        )?;
        let noise_path = require(
            classified.combined_file(orientation, ScanKind::Noise, false),
            region,
            "noise",
            diagnostics,
        )?;

        info!("Processing {} combined SNR image: {}", region, signal_path.display());
        let signal = self.phantom_stats(signal_path, &format!("{}_signal", region), inspector, diagnostics)?;
        let noise = self.central_stats(
            noise_path,
            &format!("{}_noise", region),
            false,
            inspector,
            diagnostics,
        )?;
        let decimals = self.config.decimals;
        let snr = round_to(snr(signal.mean, noise.stdev, self.config.combined_snr_scale), decimals);

        let uniform = match classified.combined_file(orientation, ScanKind::Signal, true) {
            Some(path) => {
                info!("Processing {} combined uniformity image: {}", region, path.display());
                self.phantom_stats(path, &format!("{}_uniformity", region), inspector, diagnostics)
            }
            None => {
                diagnostics.push(QaWarning::MissingNormalized {
                    subject: region.to_string(),
                });
                None
            }
        };
        let (signal_max, signal_min, signal_mean, uniformity) = match uniform {
            Some(s) => (s.max, s.min, s.mean, round_to(piu(s.max, s.min), decimals)),
            None => (0.0, 0.0, 0.0, 0.0),
        };

        info!("{} - SNR: {}, Uniformity: {}", region, snr, uniformity);
        Some(CombinedRecord {
            region: region.to_string(),
            signal_max,
            signal_min,
            signal_mean,
            noise_sd: noise.stdev,
            snr,
            uniformity,
        })
    }

    fn process_element(
        &self,
        classified: &ClassifiedFiles,
        element: CoilElement,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Option<ElementRecord> {
        let signal_path = classified.element_file(element, ScanKind::Signal);
        let noise_path = classified.element_file(element, ScanKind::Noise);
        if signal_path.is_none() && noise_path.is_none() {
            return None;
        }
        let label = element.label();
        let signal_path = require(signal_path, label, "signal", diagnostics)?;
        let noise_path = require(noise_path, label, "noise", diagnostics)?;

        info!("Processing individual element {}: {}", label, signal_path.display());
        let scan = load_scan(&self.source, signal_path, diagnostics)?;
        let roi = self.builder.peak_seeking(
            &scan.image,
            scan.metadata.pixel_spacing,
            &self.config.element_signal_roi,
        );
        let signal = measure(
            &format!("{}_signal", label),
            signal_path,
            &scan.image,
            &roi,
            inspector,
            diagnostics,
        )?;
        let noise = self.central_stats(
            noise_path,
            &format!("{}_noise", label),
            true,
            inspector,
            diagnostics,
        )?;

        let snr = round_to(
            snr(signal.mean, noise.stdev, self.config.element_snr_scale),
            self.config.decimals,
        );
        info!("{} - SNR: {}", label, snr);
        Some(ElementRecord {
            element,
            signal_mean: signal.mean,
            noise_sd: noise.stdev,
            snr,
        })
    }

    fn phantom_stats(
        &self,
        path: &Path,
        label: &str,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Option<RoiStats> {
        let scan = load_scan(&self.source, path, diagnostics)?;
        let roi = self.builder.phantom_constrained(
            &scan.image,
            scan.metadata.pixel_spacing,
            &self.config.combined_signal_roi,
        );
        measure_scan(label, &scan, &roi, inspector, diagnostics)
    }

    fn central_stats(
        &self,
        path: &Path,
        label: &str,
        element: bool,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Option<RoiStats> {
        let scan = load_scan(&self.source, path, diagnostics)?;
        let spec = if element {
            &self.config.element_noise_roi
        } else {
            &self.config.combined_noise_roi
        };
        let roi = self
            .builder
            .fixed_central(&scan.image, scan.metadata.pixel_spacing, spec);
        measure_scan(label, &scan, &roi, inspector, diagnostics)
    }
}

fn measure_scan(
    label: &str,
    scan: &Scan,
    roi: &RoiMask,
    inspector: &mut dyn RoiInspector,
    diagnostics: &mut Diagnostics,
) -> Option<RoiStats> {
    measure(label, &scan.path, &scan.image, roi, inspector, diagnostics)
}

/// Unwraps a required file, recording a missing pair otherwise
fn require<'a>(
    path: Option<&'a Path>,
    subject: &str,
    missing: &str,
    diagnostics: &mut Diagnostics,
) -> Option<&'a Path> {
    if path.is_none() {
        diagnostics.push(QaWarning::MissingPair {
            subject: subject.to_string(),
            missing: missing.to_string(),
        });
    }
    path
}
