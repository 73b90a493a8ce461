//! Storage collaborator contract for the forecaster.

use crate::error::Result;
use crate::types::{Module, NewPrediction, Prediction, RawReading};
use async_trait::async_trait;
use std::fmt;

/// A forecastable metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKey {
    /// Traffic flow rate; readings carry their location as the group.
    TrafficFlow,
    /// Total energy consumption (MW).
    EnergyConsumption,
    /// Share of renewable generation (%).
    EnergyRenewable,
    /// Air-quality index.
    AirQualityIndex,
}

impl MetricKey {
    pub fn module(&self) -> Module {
        match self {
            MetricKey::TrafficFlow => Module::Traffic,
            MetricKey::EnergyConsumption | MetricKey::EnergyRenewable => Module::Energy,
            MetricKey::AirQualityIndex => Module::Environmental,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::TrafficFlow => "flow_rate",
            MetricKey::EnergyConsumption => "total_consumption",
            MetricKey::EnergyRenewable => "renewable_percentage",
            MetricKey::AirQualityIndex => "air_quality_index",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module(), self.as_str())
    }
}

/// Read/append access the forecaster needs from a time-series store.
///
/// Implementations must be safe to call from several module tasks at once.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Readings of `key` with `start_ms <= timestamp <= end_ms`, in any order.
    async fn fetch_window(&self, key: MetricKey, start_ms: i64, end_ms: i64)
        -> Result<Vec<RawReading>>;

    /// Append one prediction to the log.
    async fn append_prediction(&self, prediction: &NewPrediction) -> Result<Prediction>;
}
