//! Least-squares trend fitting.

use crate::types::Sample;
use serde::{Deserialize, Serialize};

/// A fitted trend line `value ≈ slope * timestamp_ms + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    /// Change in value per millisecond.
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to [0, 1].
    pub r2: f64,
}

impl TrendFit {
    /// Flat, zero-confidence fit returned for fewer than two samples.
    pub const FLAT: TrendFit = TrendFit { slope: 0.0, intercept: 0.0, r2: 0.0 };

    /// Evaluate the trend line at a timestamp.
    pub fn project(&self, timestamp_ms: i64) -> f64 {
        self.slope * timestamp_ms as f64 + self.intercept
    }
}

/// Fit a least-squares line through `samples` (ascending by timestamp).
///
/// Timestamps are shifted to the first sample and centred on their mean
/// before summing, so epoch-scale milliseconds do not swamp the squares.
/// Zero variance in the values counts as a perfect fit. A fit worse than the
/// mean baseline reports `r2 = 0`.
pub fn fit_trend(samples: &[Sample]) -> TrendFit {
    if samples.len() < 2 {
        return TrendFit::FLAT;
    }

    let n = samples.len() as f64;
    let origin = samples[0].timestamp_ms;
    let xs: Vec<f64> = samples.iter().map(|s| (s.timestamp_ms - origin) as f64).collect();

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = samples.iter().map(|s| s.value).sum::<f64>() / n;

    let (sxx, sxy) = xs.iter().zip(samples).fold((0.0, 0.0), |(sxx, sxy), (x, s)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (s.value - mean_y))
    });

    let ss_tot: f64 = samples.iter().map(|s| (s.value - mean_y).powi(2)).sum();

    // All samples share one timestamp: no trend can be drawn.
    if sxx == 0.0 {
        let r2 = if ss_tot == 0.0 { 1.0 } else { 0.0 };
        return TrendFit { slope: 0.0, intercept: mean_y, r2 };
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * (mean_x + origin as f64);

    let ss_res: f64 = xs
        .iter()
        .zip(samples)
        .map(|(x, s)| {
            let predicted = mean_y + slope * (x - mean_x);
            (s.value - predicted).powi(2)
        })
        .sum();

    let r2 = if ss_tot == 0.0 { 1.0 } else { (1.0 - ss_res / ss_tot).max(0.0) };

    TrendFit { slope, intercept, r2 }
}
