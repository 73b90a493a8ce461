//! cityscope core library
//!
//! Shared types, forecasting engine, storage and utilities for the cityscope
//! smart-city monitoring stack.

pub mod alerts;
pub mod config;
pub mod error;
pub mod events;
pub mod forecast;
pub mod observability;
pub mod paths;
pub mod scheduler;
pub mod simulator;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use alerts::spawn_event_recorder;
pub use config::Config;
pub use error::{CityError, Result};
pub use events::{Event, EventBus, EventType};
pub use forecast::{CycleReport, CycleTrigger, ForecastStore, Forecaster, MetricKey};
pub use observability::{
    health::HealthChecker, init as init_observability, shutdown as shutdown_observability,
};
pub use scheduler::PeriodicTask;
pub use simulator::Simulator;
pub use state::StateManager;
pub use types::{
    Alert, DashboardMetrics, Module, NewAlert, NewPrediction, Prediction, RawReading, ReadingExport,
    Sample,
};
