use super::{load_scan, measure};
use crate::diagnostics::Diagnostics;
use crate::discovery::collect_dicom_files;
use crate::error::Result;
use crate::metrics::{piu, round_to, snr};
use crate::phantom::PhantomDetector;
use crate::render::RoiInspector;
use crate::roi::RoiBuilder;
use crate::selection::{select_best_slice, SliceCandidate};
use crate::source::{Scan, ScanSource};
use crate::types::WeeklyConfig;
use log::info;
use std::path::{Path, PathBuf};

/// Metrics of the selected weekly slice
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "PascalCase"))]
pub struct WeeklyRecord {
    pub filename: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    #[cfg_attr(feature = "json", serde(rename = "StDev"))]
    pub stdev: f64,
    #[cfg_attr(feature = "json", serde(rename = "SNR"))]
    pub snr: f64,
    #[cfg_attr(feature = "json", serde(rename = "PIU"))]
    pub piu: f64,
}

/// Outcome of a weekly run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct WeeklyReport {
    /// Slice chosen to represent the series
    pub selected: PathBuf,
    pub slice_location: Option<f64>,
    pub instance_number: Option<i32>,
    /// `None` when the ROI selected no pixel
    pub record: Option<WeeklyRecord>,
}

/// Single-slice phantom check
///
/// Picks the slice nearest isocenter, places a phantom-constrained ROI and
/// reports its statistics. SNR here is the ROI's own `mean / stdev`.
pub struct WeeklyWorkflow<S> {
    source: S,
    config: WeeklyConfig,
    builder: RoiBuilder,
}

impl<S: ScanSource> WeeklyWorkflow<S> {
    pub fn new(source: S, config: WeeklyConfig) -> Self {
        let builder = RoiBuilder::new(PhantomDetector::new(config.detector.clone()));
        Self {
            source,
            config,
            builder,
        }
    }

    /// Runs over the DICOM files directly inside `directory`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be listed, or
    /// [`QaError::NoCandidateSlices`](crate::error::QaError::NoCandidateSlices) if no file could be loaded
    pub fn run_directory(
        &self,
        directory: &Path,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Result<WeeklyReport> {
        let files = collect_dicom_files(directory)?;
        info!("Found {} DICOM files in {}", files.len(), directory.display());
        self.run(&files, inspector, diagnostics)
    }

    /// Runs over an explicit list of candidate files
    ///
    /// Files that fail to load are skipped and recorded. Only the selection
    /// keys are kept per file; the chosen slice is read again for measurement.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::NoCandidateSlices`](crate::error::QaError::NoCandidateSlices) if no file could be loaded, or
    /// the read error if the chosen slice can no longer be loaded
    pub fn run(
        &self,
        files: &[PathBuf],
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Result<WeeklyReport> {
        let candidates: Vec<SliceCandidate> = files
            .iter()
            .filter_map(|path| load_scan(&self.source, path, diagnostics))
            .map(|scan| SliceCandidate::from_scan(&scan))
            .collect();

        let best = select_best_slice(&candidates)?;
        info!(
            "Selected slice: {} (Slice Location: {:?}, Instance Number: {:?}, Mean Intensity: {:.2})",
            best.file_path.display(),
            best.slice_location,
            best.instance_number,
            best.mean_intensity
        );

        let scan = self.source.read_scan(&best.file_path)?;

        Ok(WeeklyReport {
            selected: best.file_path.clone(),
            slice_location: best.slice_location,
            instance_number: best.instance_number,
            record: self.measure_slice(&scan, inspector, diagnostics),
        })
    }

    fn measure_slice(
        &self,
        scan: &Scan,
        inspector: &mut dyn RoiInspector,
        diagnostics: &mut Diagnostics,
    ) -> Option<WeeklyRecord> {
        let roi = self.builder.phantom_constrained(
            &scan.image,
            scan.metadata.pixel_spacing,
            &self.config.signal_roi,
        );
        let label = format!("{}_signal", scan.metadata.file_name);
        let stats = measure(&label, &scan.path, &scan.image, &roi, inspector, diagnostics)?;

        let decimals = self.config.decimals;
        let rounded = stats.rounded(decimals);
        let record = WeeklyRecord {
            filename: scan.metadata.file_name.clone(),
            mean: rounded.mean,
            min: rounded.min,
            max: rounded.max,
            sum: rounded.sum,
            stdev: rounded.stdev,
            snr: round_to(snr(stats.mean, stats.stdev, self.config.snr_scale), decimals),
            piu: round_to(piu(stats.max, stats.min), decimals),
        };
        info!("Processed {} successfully.", scan.path.display());
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScanMetadata;
    use crate::diagnostics::QaWarning;
    use crate::error::QaError;
    use crate::source::InMemorySource;
    use crate::types::{Image, PhantomRoiSpec};
    use crate::workflow::fixtures::disk_image;
    use ndarray::Array2;
    use std::cell::Cell;
    use std::f64::consts::PI;

    fn located(location: Option<f64>) -> ScanMetadata {
        ScanMetadata {
            slice_location: location,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_disk_round_trip() {
        let source = InMemorySource::new().with_scan(
            "/in/slice.dcm",
            located(Some(0.0)),
            disk_image(256, 256, 128.0, 128.0, 50.0, 1000.0),
        );
        let config = WeeklyConfig {
            signal_roi: PhantomRoiSpec::default().with_target_area(PI * 40.0 * 40.0),
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();

        let report = WeeklyWorkflow::new(&source, config)
            .run(&source.paths(), &mut (), &mut diagnostics)
            .unwrap();
        let record = report.record.unwrap();

        assert_eq!(record.filename, "slice.dcm");
        assert_eq!(record.mean, 1000.0);
        assert_eq!(record.stdev, 0.0);
        assert_eq!(record.snr, 0.0);
        assert_eq!(record.piu, 100.0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_selects_slice_nearest_isocenter() {
        let phantom = disk_image(128, 128, 64.0, 64.0, 40.0, 500.0);
        let source = InMemorySource::new()
            .with_scan("/in/a.dcm", located(Some(-30.0)), phantom.clone())
            .with_scan("/in/b.dcm", located(Some(1.5)), phantom.clone())
            .with_scan("/in/c.dcm", located(None), phantom);
        let mut diagnostics = Diagnostics::new();

        let report = WeeklyWorkflow::new(&source, WeeklyConfig::default())
            .run(&source.paths(), &mut (), &mut diagnostics)
            .unwrap();

        assert_eq!(report.selected, PathBuf::from("/in/b.dcm"));
        assert_eq!(report.slice_location, Some(1.5));
        assert!(report.record.is_some());
    }

    #[test]
    fn test_snr_is_mean_over_stdev_of_roi() {
        // Alternating 900/1100 stripes inside the phantom
        let pixels = Array2::from_shape_fn((128, 128), |(y, x)| {
            let (dy, dx) = (y as f64 - 64.0, x as f64 - 64.0);
            if dy * dy + dx * dx <= 45.0 * 45.0 {
                if x % 2 == 0 {
                    900.0
                } else {
                    1100.0
                }
            } else {
                0.0
            }
        });
        let source = InMemorySource::new().with_scan("/in/s.dcm", located(Some(0.0)), Image::new(pixels));
        let config = WeeklyConfig {
            signal_roi: PhantomRoiSpec::default().with_target_area(PI * 30.0 * 30.0),
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();

        let record = WeeklyWorkflow::new(&source, config)
            .run(&source.paths(), &mut (), &mut diagnostics)
            .unwrap()
            .record
            .unwrap();

        assert!((record.mean - 1000.0).abs() < 10.0);
        assert!((record.stdev - 100.0).abs() < 1.0);
        assert!((record.snr - record.mean / record.stdev).abs() < 0.1);
        assert_eq!(record.piu, 90.0);
    }

    #[test]
    fn test_empty_input_is_no_candidate_slices() {
        let source = InMemorySource::new();
        let mut diagnostics = Diagnostics::new();
        let result = WeeklyWorkflow::new(&source, WeeklyConfig::default()).run(&[], &mut (), &mut diagnostics);
        assert!(matches!(result, Err(QaError::NoCandidateSlices)));
    }

    #[test]
    fn test_unreadable_files_skipped() {
        let source = InMemorySource::new().with_scan(
            "/in/good.dcm",
            located(Some(10.0)),
            disk_image(128, 128, 64.0, 64.0, 40.0, 500.0),
        );
        let files = vec![PathBuf::from("/in/bad.dcm"), PathBuf::from("/in/good.dcm")];
        let mut diagnostics = Diagnostics::new();

        let report = WeeklyWorkflow::new(&source, WeeklyConfig::default())
            .run(&files, &mut (), &mut diagnostics)
            .unwrap();

        assert_eq!(report.selected, PathBuf::from("/in/good.dcm"));
        assert!(matches!(
            diagnostics.warnings(),
            [QaWarning::Skipped { file, .. }] if file == Path::new("/in/bad.dcm")
        ));
    }

    #[test]
    fn test_blank_slice_reports_fallback() {
        let source = InMemorySource::new().with_scan(
            "/in/blank.dcm",
            located(Some(0.0)),
            Image::new(Array2::zeros((64, 64))),
        );
        let mut diagnostics = Diagnostics::new();

        let report = WeeklyWorkflow::new(&source, WeeklyConfig::default())
            .run(&source.paths(), &mut (), &mut diagnostics)
            .unwrap();

        assert!(report.record.is_some());
        assert!(diagnostics
            .warnings()
            .iter()
            .any(|w| matches!(w, QaWarning::PhantomNotDetected { .. })));
    }

    /// Counts full reads made through an inner source
    struct CountingSource<'a> {
        inner: &'a InMemorySource,
        scans_read: Cell<usize>,
    }

    impl ScanSource for CountingSource<'_> {
        fn read_header(&self, path: &Path) -> Result<ScanMetadata> {
            self.inner.read_header(path)
        }

        fn read_scan(&self, path: &Path) -> Result<Scan> {
            self.scans_read.set(self.scans_read.get() + 1);
            self.inner.read_scan(path)
        }
    }

    #[test]
    fn test_selected_slice_is_read_again_for_measurement() {
        let phantom = disk_image(128, 128, 64.0, 64.0, 40.0, 500.0);
        let inner = InMemorySource::new()
            .with_scan("/in/a.dcm", located(Some(12.0)), phantom.clone())
            .with_scan("/in/b.dcm", located(Some(-2.0)), phantom.clone())
            .with_scan("/in/c.dcm", located(Some(30.0)), phantom);
        let source = CountingSource {
            inner: &inner,
            scans_read: Cell::new(0),
        };
        let mut diagnostics = Diagnostics::new();

        let report = WeeklyWorkflow::new(&source, WeeklyConfig::default())
            .run(&inner.paths(), &mut (), &mut diagnostics)
            .unwrap();

        assert_eq!(report.selected, PathBuf::from("/in/b.dcm"));
        assert_eq!(report.record.unwrap().filename, "b.dcm");
        assert_eq!(source.scans_read.get(), 4);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_record_serializes_with_report_columns() {
        let record = WeeklyRecord {
            filename: "IM_0004.dcm".to_string(),
            mean: 1012.34,
            min: 950.0,
            max: 1060.5,
            sum: 3_400_000.0,
            stdev: 12.5,
            snr: 80.99,
            piu: 94.52,
        };
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["Filename", "Mean", "Min", "Max", "Sum", "StDev", "SNR", "PIU"] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(keys.len(), 8);
        assert_eq!(value["SNR"], 80.99);
    }
}
