//! Latest-sample anomaly check.

use crate::types::Sample;
use serde::{Deserialize, Serialize};

/// Minimum samples before the detector passes judgment.
pub const MIN_ANOMALY_SAMPLES: usize = 10;

/// Outcome of [`detect_anomaly`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyCheck {
    pub is_anomaly: bool,
    /// `mean + 2 * stddev`; 0 when no judgment was made.
    pub threshold: f64,
}

impl AnomalyCheck {
    pub const NO_JUDGMENT: AnomalyCheck = AnomalyCheck { is_anomaly: false, threshold: 0.0 };
}

/// Flag the most recent sample if it exceeds the population mean by more than
/// two standard deviations.
pub fn detect_anomaly(samples: &[Sample]) -> AnomalyCheck {
    if samples.len() < MIN_ANOMALY_SAMPLES {
        return AnomalyCheck::NO_JUDGMENT;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| s.value).sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s.value - mean).powi(2)).sum::<f64>() / n;
    let threshold = mean + 2.0 * variance.sqrt();

    let latest = samples[samples.len() - 1].value;
    AnomalyCheck { is_anomaly: latest > threshold, threshold }
}
