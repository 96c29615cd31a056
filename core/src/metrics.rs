//! Descriptive statistics, SNR and percent integral uniformity

use crate::error::{QaError, Result};
use crate::roi::RoiMask;
use crate::types::Image;

/// Statistics over the pixels selected by an ROI
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct RoiStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    /// Population standard deviation
    pub stdev: f64,
    pub count: usize,
}

impl RoiStats {
    /// Computes statistics over `values`
    ///
    /// # Errors
    ///
    /// Returns [`QaError::EmptyRoi`] if `values` is empty
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(QaError::EmptyRoi);
        }

        let count = values.len();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let mean = sum / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Ok(Self {
            mean,
            min,
            max,
            sum,
            stdev: variance.sqrt(),
            count,
        })
    }

    /// Computes statistics over the pixels of `image` selected by `roi`
    ///
    /// # Errors
    ///
    /// Returns [`QaError::EmptyRoi`] if the mask selects no pixel
    pub fn compute(image: &Image, roi: &RoiMask) -> Result<Self> {
        Self::from_values(&roi.select(image))
    }

    /// Percent integral uniformity of the selected pixels
    pub fn piu(&self) -> f64 {
        piu(self.max, self.min)
    }

    /// Copy with every statistic rounded to `decimals`
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            mean: round_to(self.mean, decimals),
            min: round_to(self.min, decimals),
            max: round_to(self.max, decimals),
            sum: round_to(self.sum, decimals),
            stdev: round_to(self.stdev, decimals),
            count: self.count,
        }
    }
}

/// `k * signal_mean / noise_stdev`, or 0 when the noise deviation is 0
///
/// # Example
///
/// ```
/// use phantomqa_core::metrics::{round_to, snr};
///
/// assert_eq!(round_to(snr(100.0, 5.0, 0.66), 1), 13.2);
/// assert_eq!(snr(100.0, 0.0, 0.7), 0.0);
/// ```
pub fn snr(signal_mean: f64, noise_stdev: f64, k: f64) -> f64 {
    if noise_stdev == 0.0 {
        0.0
    } else {
        k * signal_mean / noise_stdev
    }
}

/// `100 * (1 - (max - min) / (max + min))`, or 0 when `max + min == 0`
pub fn piu(max: f64, min: f64) -> f64 {
    let denom = max + min;
    if denom == 0.0 {
        0.0
    } else {
        100.0 * (1.0 - (max - min) / denom)
    }
}

/// Rounds half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiMode;
    use ndarray::Array2;
    use rstest::rstest;

    #[test]
    fn test_stats_over_values() {
        let stats = RoiStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.sum, 40.0);
        assert_eq!(stats.stdev, 2.0);
        assert_eq!(stats.count, 8);
    }

    #[test]
    fn test_empty_roi_is_error() {
        assert!(matches!(RoiStats::from_values(&[]), Err(QaError::EmptyRoi)));

        let image = Image::new(Array2::from_elem((4, 4), 1.0));
        let roi = RoiMask::disk(4, 4, 100.0, 100.0, 1.0, RoiMode::FixedCentral);
        assert!(matches!(RoiStats::compute(&image, &roi), Err(QaError::EmptyRoi)));
    }

    #[test]
    fn test_uniform_disk_statistics() {
        let image = Image::new(Array2::from_elem((64, 64), 1000.0));
        let roi = RoiMask::disk(64, 64, 32.0, 32.0, 10.0, RoiMode::PhantomConstrained);
        let stats = RoiStats::compute(&image, &roi).unwrap();
        assert_eq!(stats.mean, 1000.0);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!(stats.piu(), 100.0);
        assert_eq!(snr(stats.mean, stats.stdev, 1.0), 0.0);
    }

    #[rstest]
    #[case(0.66)]
    #[case(0.7)]
    #[case(1.0)]
    fn test_snr_zero_noise_is_zero(#[case] k: f64) {
        assert_eq!(snr(1234.5, 0.0, k), 0.0);
    }

    #[test]
    fn test_snr_scaled() {
        assert_eq!(round_to(snr(100.0, 5.0, 0.66), 1), 13.2);
        assert_eq!(round_to(snr(200.0, 4.0, 0.7), 1), 35.0);
        assert_eq!(snr(50.0, 5.0, 1.0), 10.0);
    }

    #[rstest]
    #[case(0.0, 0.0, 0.0)]
    #[case(10.0, -10.0, 0.0)]
    #[case(500.0, 500.0, 100.0)]
    #[case(110.0, 90.0, 90.0)]
    fn test_piu(#[case] max: f64, #[case] min: f64, #[case] expected: f64) {
        assert!((piu(max, min) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-2.56, 1), -2.6);
        assert_eq!(round_to(7.0, 0), 7.0);
    }

    #[test]
    fn test_rounded_stats() {
        let stats = RoiStats::from_values(&[1.0, 2.0, 2.0]).unwrap().rounded(2);
        assert_eq!(stats.mean, 1.67);
        assert_eq!(stats.stdev, 0.47);
    }
}
