//! Tuned constants for each QA workflow
//!
//! The three workflows carry slightly different constants for what is the
//! same underlying operation (vertical offset, SNR multiplier, rounding).
//! They are kept as independent per-workflow settings.

/// SNR multiplier for individual coil elements and NEMA body pairs
pub const ELEMENT_SNR_SCALE: f64 = 0.66;
/// SNR multiplier for combined-coil torso views
pub const COMBINED_SNR_SCALE: f64 = 0.7;
/// Plain `mean / stdev` ratio used by the weekly check
pub const UNSCALED_SNR: f64 = 1.0;

/// 338 cm² signal ROI
pub const SIGNAL_AREA_MM2: f64 = 338.0 * 100.0;
/// 340 cm² background noise ROI
pub const NOISE_AREA_MM2: f64 = 340.0 * 100.0;

/// Phantom segmentation parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct DetectorConfig {
    /// Connected components smaller than this are discarded as noise specks
    pub min_object_px: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { min_object_px: 500 }
    }
}

/// Phantom-constrained ROI sized to a target physical area
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct PhantomRoiSpec {
    pub target_area_mm2: f64,
    /// Downward shift applied to the detected centroid
    pub vertical_offset_px: f64,
    /// Minimum distance kept between the ROI edge and the phantom edge
    pub object_margin_px: usize,
}

impl Default for PhantomRoiSpec {
    fn default() -> Self {
        Self {
            target_area_mm2: SIGNAL_AREA_MM2,
            vertical_offset_px: 3.0,
            object_margin_px: 2,
        }
    }
}

impl PhantomRoiSpec {
    pub fn with_target_area(mut self, area_mm2: f64) -> Self {
        self.target_area_mm2 = area_mm2;
        self
    }

    pub fn with_vertical_offset(mut self, offset_px: f64) -> Self {
        self.vertical_offset_px = offset_px;
        self
    }
}

/// ROI centered on the image with a fixed physical area
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct CentralRoiSpec {
    pub target_area_mm2: f64,
    /// When set, the center is kept `floor(radius) + margin` px from every edge
    pub edge_margin_px: Option<usize>,
}

impl Default for CentralRoiSpec {
    fn default() -> Self {
        Self {
            target_area_mm2: NOISE_AREA_MM2,
            edge_margin_px: None,
        }
    }
}

impl CentralRoiSpec {
    pub fn with_target_area(mut self, area_mm2: f64) -> Self {
        self.target_area_mm2 = area_mm2;
        self
    }

    pub fn with_edge_margin(mut self, margin_px: usize) -> Self {
        self.edge_margin_px = Some(margin_px);
        self
    }
}

/// Small ROI placed on the brightest nonzero pixel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct PeakRoiSpec {
    pub radius_mm: f64,
    pub edge_margin_px: usize,
}

impl Default for PeakRoiSpec {
    fn default() -> Self {
        Self {
            radius_mm: 3.0,
            edge_margin_px: 5,
        }
    }
}

/// Settings for the single-slice weekly check
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct WeeklyConfig {
    pub detector: DetectorConfig,
    pub signal_roi: PhantomRoiSpec,
    pub snr_scale: f64,
    pub decimals: u32,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            signal_roi: PhantomRoiSpec::default().with_vertical_offset(2.5),
            snr_scale: UNSCALED_SNR,
            decimals: 2,
        }
    }
}

/// Settings for the multi-orientation NEMA body check
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct NemaBodyConfig {
    pub detector: DetectorConfig,
    pub signal_roi: PhantomRoiSpec,
    pub noise_roi: CentralRoiSpec,
    pub snr_scale: f64,
    /// Precision of Mean/Min/Max/Sum/StDev
    pub metric_decimals: u32,
    /// Precision of SNR and PIU
    pub ratio_decimals: u32,
}

impl Default for NemaBodyConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            signal_roi: PhantomRoiSpec::default(),
            noise_roi: CentralRoiSpec::default(),
            snr_scale: ELEMENT_SNR_SCALE,
            metric_decimals: 4,
            ratio_decimals: 2,
        }
    }
}

impl NemaBodyConfig {
    pub fn with_snr_scale(mut self, scale: f64) -> Self {
        self.snr_scale = scale;
        self
    }
}

/// Settings for the torso coil check
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct TorsoConfig {
    pub detector: DetectorConfig,
    pub combined_signal_roi: PhantomRoiSpec,
    pub combined_noise_roi: CentralRoiSpec,
    pub element_signal_roi: PeakRoiSpec,
    pub element_noise_roi: CentralRoiSpec,
    pub combined_snr_scale: f64,
    pub element_snr_scale: f64,
    pub decimals: u32,
}

impl Default for TorsoConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            combined_signal_roi: PhantomRoiSpec::default(),
            combined_noise_roi: CentralRoiSpec::default(),
            element_signal_roi: PeakRoiSpec::default(),
            element_noise_roi: CentralRoiSpec::default().with_edge_margin(5),
            combined_snr_scale: COMBINED_SNR_SCALE,
            element_snr_scale: ELEMENT_SNR_SCALE,
            decimals: 1,
        }
    }
}

/// All workflow settings, as loaded from a config file
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct QaConfig {
    pub weekly: WeeklyConfig,
    pub nema_body: NemaBodyConfig,
    pub torso: TorsoConfig,
}

impl QaConfig {
    /// Loads settings from a JSON file; absent keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON
    #[cfg(feature = "json")]
    pub fn from_json_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[cfg(feature = "json")]
    pub fn from_json_str(text: &str) -> crate::error::Result<Self> {
        serde_json::from_str(text).map_err(|e| crate::error::QaError::Config(e.to_string()))
    }
}
