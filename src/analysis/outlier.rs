//! IQR-based outlier detection for a single metric series.

use serde::Serialize;

/// Default IQR multiplier for the outlier fences.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Default window for [`moving_average`].
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;

/// Fewer valid points than this yields no statistics.
const MIN_VALID_POINTS: usize = 4;

/// Distribution summary and IQR fences for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Values strictly outside the fences, ascending.
    pub outliers: Vec<f64>,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Detect outliers with the default 1.5 multiplier.
pub fn detect_outliers(values: &[Option<f64>]) -> Option<DistributionStats> {
    detect_outliers_with(values, DEFAULT_IQR_MULTIPLIER)
}

/// Compute distribution statistics and IQR outliers over the valid values.
///
/// Missing and NaN entries are dropped first. Returns `None` when fewer than
/// four valid values remain. Quartiles are taken by positional index on the
/// sorted values (`floor(n * 0.25)` and `floor(n * 0.75)`), not interpolated.
pub fn detect_outliers_with(values: &[Option<f64>], multiplier: f64) -> Option<DistributionStats> {
    let mut sorted: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();

    let n = sorted.len();
    if n < MIN_VALID_POINTS {
        return None;
    }

    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = sorted[n / 4];
    let q3 = sorted[n * 3 / 4];
    let iqr = q3 - q1;

    let lower_bound = q1 - iqr * multiplier;
    let upper_bound = q3 + iqr * multiplier;

    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower_bound || v > upper_bound)
        .collect();

    let mean = sorted.iter().sum::<f64>() / n as f64;

    Some(DistributionStats {
        q1,
        q3,
        iqr,
        lower_bound,
        upper_bound,
        outliers,
        mean,
        median: sorted[n / 2],
        min: sorted[0],
        max: sorted[n - 1],
    })
}

/// Trailing moving average over `window` consecutive values.
///
/// One output per full window, so the result is `len - window + 1` long.
/// Missing and NaN entries are skipped inside a window; a window with no
/// valid values averages to `None`. Series shorter than the window (and a
/// zero window) are returned unchanged.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return values.to_vec();
    }

    values
        .windows(window)
        .map(|w| {
            let valid: Vec<f64> = w.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
            if valid.is_empty() {
                None
            } else {
                Some(valid.iter().sum::<f64>() / valid.len() as f64)
            }
        })
        .collect()
}
