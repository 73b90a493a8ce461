//! Time-series samples and the validation boundary in front of the fitter.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One validated observation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp (milliseconds).
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self { timestamp_ms, value }
    }
}

/// A reading as handed back by a store, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Unix timestamp (milliseconds); stores may hold rows without one.
    pub timestamp_ms: Option<i64>,
    pub value: f64,
    /// Grouping key, e.g. the traffic sensor location.
    pub group: Option<String>,
}

impl RawReading {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self { timestamp_ms: Some(timestamp_ms), value, group: None }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Turn raw readings into fit-ready samples.
///
/// Readings without a timestamp or with a non-finite value are dropped with a
/// warning. The result is sorted by timestamp ascending.
pub fn sanitize_readings<'a, I>(series: &str, readings: I) -> Vec<Sample>
where
    I: IntoIterator<Item = &'a RawReading>,
{
    let mut missing_ts = 0usize;
    let mut non_finite = 0usize;

    let mut samples: Vec<Sample> = readings
        .into_iter()
        .filter_map(|r| match r.timestamp_ms {
            None => {
                missing_ts += 1;
                None
            }
            Some(_) if !r.value.is_finite() => {
                non_finite += 1;
                None
            }
            Some(ts) => Some(Sample::new(ts, r.value)),
        })
        .collect();

    if missing_ts > 0 {
        warn!(series, dropped = missing_ts, "Dropping readings without a timestamp");
        metrics::counter!("cityscope_samples_rejected_total", "reason" => "missing_timestamp")
            .increment(missing_ts as u64);
    }
    if non_finite > 0 {
        warn!(series, dropped = non_finite, "Dropping readings with non-finite values");
        metrics::counter!("cityscope_samples_rejected_total", "reason" => "non_finite")
            .increment(non_finite as u64);
    }

    samples.sort_by_key(|s| s.timestamp_ms);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sorts_ascending() {
        let raw = vec![RawReading::new(300, 3.0), RawReading::new(100, 1.0), RawReading::new(200, 2.0)];
        let samples = sanitize_readings("test", &raw);
        let ts: Vec<i64> = samples.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(ts, vec![100, 200, 300]);
    }

    #[test]
    fn test_sanitize_drops_missing_timestamp_and_nan() {
        let raw = vec![
            RawReading::new(100, 1.0),
            RawReading { timestamp_ms: None, value: 5.0, group: None },
            RawReading::new(200, f64::NAN),
            RawReading::new(300, f64::INFINITY),
            RawReading::new(400, 4.0),
        ];
        let samples = sanitize_readings("test", &raw);
        assert_eq!(samples, vec![Sample::new(100, 1.0), Sample::new(400, 4.0)]);
    }
}
