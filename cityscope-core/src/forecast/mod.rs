//! Predictive analytics.
//!
//! Pure forecasting math plus the engine that runs it across the city
//! modules.
//!
//! ```text
//!  ForecastStore::fetch_window ──► sanitize_readings ──► fit_trend ─┐
//!                                                      moving_average ├─► forecast ──► append_prediction
//!                                                      detect_anomaly ──► EventBus
//! ```

mod anomaly;
mod average;
mod combiner;
mod engine;
mod regression;
mod store;

pub use anomaly::{detect_anomaly, AnomalyCheck, MIN_ANOMALY_SAMPLES};
pub use average::moving_average;
pub use combiner::{
    forecast, predict_next_value, Forecast, MIN_FORECAST_SAMPLES, MOVING_AVERAGE_WINDOW,
};
pub use engine::{CycleReport, CycleTrigger, Forecaster, ModuleOutcome};
pub use regression::{fit_trend, TrendFit};
pub use store::{ForecastStore, MetricKey};

/// Horizons (hours) forecast for every series.
pub const STANDARD_HORIZONS: [u32; 4] = [1, 6, 12, 24];

/// Renewable share is not forecast one hour out.
pub const RENEWABLE_HORIZONS: [u32; 3] = [6, 12, 24];
