//! Prediction records.
//!
//! Predictions form an append-only log: they are inserted once and never
//! updated or deleted by the forecaster.

use super::Module;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A prediction waiting to be appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub module: Module,
    /// Label such as "flow", "demand", "renewable" or "quality".
    pub prediction_type: String,
    pub predicted_value: f64,
    /// In [0.1, 0.95] for fitted forecasts.
    pub confidence: f64,
    pub time_horizon_hours: u32,
    pub metadata: BTreeMap<String, String>,
}

impl NewPrediction {
    pub fn new(
        module: Module,
        prediction_type: &str,
        predicted_value: f64,
        confidence: f64,
        time_horizon_hours: u32,
    ) -> Self {
        Self {
            module,
            prediction_type: prediction_type.to_string(),
            predicted_value,
            confidence,
            time_horizon_hours,
            metadata: BTreeMap::new(),
        }
    }

    /// Add metadata to the prediction.
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// A persisted prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    pub module: Module,
    pub prediction_type: String,
    pub predicted_value: f64,
    pub confidence: f64,
    pub time_horizon_hours: u32,
    pub metadata: BTreeMap<String, String>,
    /// Unix timestamp (milliseconds) of insertion.
    pub created_at_ms: i64,
}
