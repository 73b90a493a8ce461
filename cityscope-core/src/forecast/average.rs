//! Trailing moving average.

use crate::types::Sample;

/// Arithmetic mean of the last `min(window, len)` values; 0 when there is
/// nothing to average.
pub fn moving_average(samples: &[Sample], window: usize) -> f64 {
    let take = window.min(samples.len());
    if take == 0 {
        return 0.0;
    }
    let recent = &samples[samples.len() - take..];
    recent.iter().map(|s| s.value).sum::<f64>() / take as f64
}
