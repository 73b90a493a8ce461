//! Core domain types for cityscope.

pub mod alert;
pub mod dashboard;
pub mod export;
pub mod module;
pub mod prediction;
pub mod readings;
pub mod sample;

// Re-exports
pub use alert::{Activity, Alert, AlertKind, AlertSeverity, NewActivity, NewAlert};
pub use dashboard::{AirQuality, DashboardMetrics};
pub use export::ReadingExport;
pub use module::Module;
pub use prediction::{NewPrediction, Prediction};
pub use readings::{EnergyReading, EnvironmentalReading, PopulationReading, TrafficReading};
pub use sample::{sanitize_readings, RawReading, Sample};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64
}

/// Milliseconds in one hour.
pub const HOUR_MS: i64 = 60 * 60 * 1000;
