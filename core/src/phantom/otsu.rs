const NUM_BINS: usize = 256;

/// Otsu's method for automatic threshold selection
///
/// Builds a 256-bin histogram over the full intensity range (background
/// zeros included) and returns the center of the bin that maximizes the
/// between-class variance. Ties keep the lowest bin. A constant input
/// returns that constant, so `value > threshold` selects nothing.
pub fn otsu_threshold<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let data: Vec<f64> = values.into_iter().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() {
        return 0.0;
    }

    let min_val = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max_val = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    if max_val - min_val <= f64::EPSILON * max_val.abs().max(1.0) {
        return min_val;
    }

    let bin_width = (max_val - min_val) / NUM_BINS as f64;
    let mut histogram = [0usize; NUM_BINS];
    for &v in &data {
        let bin = ((v - min_val) / bin_width).floor() as usize;
        histogram[bin.min(NUM_BINS - 1)] += 1;
    }

    let total = data.len() as f64;
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut max_variance = f64::NEG_INFINITY;
    let mut optimal_bin = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;

        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);
        if variance > max_variance {
            max_variance = variance;
            optimal_bin = t;
        }
    }

    min_val + (optimal_bin as f64 + 0.5) * bin_width
}
