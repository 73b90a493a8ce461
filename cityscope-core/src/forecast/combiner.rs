//! Blends the regression projection with a short moving average.

use super::average::moving_average;
use super::regression::fit_trend;
use crate::types::{now_ms, Sample, HOUR_MS};
use serde::{Deserialize, Serialize};

/// Minimum samples before a forecast is produced.
pub const MIN_FORECAST_SAMPLES: usize = 5;

/// Number of trailing samples averaged into every forecast.
pub const MOVING_AVERAGE_WINDOW: usize = 5;

/// Floor on the regression share of the blend.
const MIN_REGRESSION_WEIGHT: f64 = 0.3;

const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;

/// A point forecast with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub value: f64,
    pub confidence: f64,
}

impl Forecast {
    /// Returned when there is too little data to forecast.
    pub const REFUSED: Forecast = Forecast { value: 0.0, confidence: 0.0 };

    pub fn is_refused(&self) -> bool {
        *self == Self::REFUSED
    }
}

/// Forecast the value `horizon_hours` after `now_ms`.
///
/// `samples` must be sorted ascending by timestamp. Fewer than
/// [`MIN_FORECAST_SAMPLES`] samples yields [`Forecast::REFUSED`].
pub fn forecast(samples: &[Sample], horizon_hours: u32, now_ms: i64) -> Forecast {
    if samples.len() < MIN_FORECAST_SAMPLES {
        return Forecast::REFUSED;
    }

    let trend = fit_trend(samples);
    let recent = moving_average(samples, MOVING_AVERAGE_WINDOW);

    let target_ms = now_ms + i64::from(horizon_hours) * HOUR_MS;
    let projected = trend.project(target_ms);

    let regression_weight = trend.r2.max(MIN_REGRESSION_WEIGHT);
    let value = projected * regression_weight + recent * (1.0 - regression_weight);
    let confidence = (trend.r2 * 0.9).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

    Forecast { value, confidence }
}

/// [`forecast`] against the current wall clock.
pub fn predict_next_value(samples: &[Sample], horizon_hours: u32) -> Forecast {
    forecast(samples, horizon_hours, now_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_717_200_000_000;

    /// 24 hourly samples ending at `NOW`, rising linearly from 40 to 85.
    fn rising_flow() -> Vec<Sample> {
        (0..24)
            .map(|i| {
                let value = 40.0 + 45.0 * i as f64 / 23.0;
                Sample::new(NOW - (23 - i) * HOUR_MS, value)
            })
            .collect()
    }

    #[test]
    fn test_refuses_below_minimum() {
        let samples: Vec<Sample> = rising_flow().into_iter().take(4).collect();
        assert!(forecast(&samples, 1, NOW).is_refused());
        assert!(forecast(&[], 24, NOW).is_refused());
    }

    #[test]
    fn test_clean_linear_series_extrapolates() {
        let result = forecast(&rising_flow(), 1, NOW);
        let expected = 85.0 + 45.0 / 23.0;
        assert!((result.value - expected).abs() < 0.01, "got {}", result.value);
        assert!(result.confidence > 0.5);
        assert!((result.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_noisy_series_anchors_to_recent_average() {
        let values = [10.0, 90.0, 10.0, 90.0, 10.0, 90.0, 10.0, 90.0, 50.0, 50.0];
        let samples: Vec<Sample> = values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(NOW - (9 - i as i64) * HOUR_MS, *v))
            .collect();
        let result = forecast(&samples, 6, NOW);

        assert_eq!(result.confidence, 0.1);
        assert!(result.value > 10.0 && result.value < 90.0, "got {}", result.value);
    }

    #[test]
    fn test_confidence_capped_for_constant_series() {
        let samples: Vec<Sample> =
            (0..8).map(|i| Sample::new(NOW - (7 - i) * HOUR_MS, 12.0)).collect();
        let result = forecast(&samples, 12, NOW);
        assert_eq!(result.confidence, 0.9);
        assert!((result.value - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_always_in_band() {
        let shapes: [fn(i64) -> f64; 4] = [
            |i| i as f64,
            |i| (i as f64).sin() * 100.0,
            |i| if i % 2 == 0 { 1.0 } else { -1.0 },
            |i| (i * i) as f64,
        ];
        for shape in shapes {
            for len in 5..30 {
                let samples: Vec<Sample> =
                    (0..len).map(|i| Sample::new(NOW - (len - i) * HOUR_MS, shape(i))).collect();
                let result = forecast(&samples, 6, NOW);
                assert!((0.1..=0.95).contains(&result.confidence), "{}", result.confidence);
            }
        }
    }

    #[test]
    fn test_deterministic_for_same_window_and_clock() {
        let samples = rising_flow();
        assert_eq!(forecast(&samples, 12, NOW), forecast(&samples, 12, NOW));
    }
}
