//! City metric readings as written by the simulator (or any other feed).
//!
//! `timestamp_ms` of `None` means "stamp with the insert time".

use serde::{Deserialize, Serialize};

/// Traffic sensor reading for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReading {
    pub timestamp_ms: Option<i64>,
    pub location: String,
    /// Flow rate as a percentage of capacity.
    pub flow_rate: f64,
    /// "low", "medium" or "high".
    pub congestion_level: String,
    /// km/h
    pub average_speed: Option<f64>,
    pub vehicle_count: Option<i64>,
}

/// City-wide energy reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    pub timestamp_ms: Option<i64>,
    /// MW
    pub total_consumption: f64,
    pub renewable_percentage: f64,
    pub solar_output: Option<f64>,
    pub wind_output: Option<f64>,
    pub grid_load: Option<f64>,
    pub peak_demand: Option<f64>,
}

/// Environmental sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    pub timestamp_ms: Option<i64>,
    pub air_quality_index: i64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub noise_level: Option<f64>,
}

/// Population snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationReading {
    pub timestamp_ms: Option<i64>,
    pub total_population: i64,
    pub active_users: Option<i64>,
    pub growth_rate: Option<f64>,
    pub demographics: Option<serde_json::Value>,
}
