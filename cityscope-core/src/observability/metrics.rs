//! Core metrics definitions.
//!
//! All metrics follow Prometheus naming conventions:
//! - `_total` suffix for counters
//! - `_seconds` suffix for histograms measuring duration

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};

/// Register all core metrics with descriptions.
///
/// This ensures metrics appear in `/metrics` with proper metadata.
pub fn register_core_metrics() {
    // Forecaster
    describe_counter!(
        "cityscope_forecast_cycles_total",
        "Total number of prediction generation cycles (by trigger)"
    );
    describe_histogram!(
        "cityscope_forecast_cycle_duration_seconds",
        "Wall time of a full prediction generation cycle"
    );
    describe_counter!(
        "cityscope_predictions_created_total",
        "Total number of predictions appended (by module)"
    );
    describe_counter!(
        "cityscope_forecast_module_failures_total",
        "Total number of module procedures that failed within a cycle (by module)"
    );
    describe_counter!(
        "cityscope_anomalies_detected_total",
        "Total number of series whose latest sample exceeded mean + 2 stddev (by module)"
    );
    describe_counter!(
        "cityscope_samples_rejected_total",
        "Total number of readings dropped before fitting (by reason)"
    );
    describe_gauge!(
        "cityscope_last_cycle_predictions",
        "Number of predictions created by the most recent cycle"
    );

    // Simulator
    describe_counter!("cityscope_simulation_ticks_total", "Total number of simulator ticks");
    describe_counter!(
        "cityscope_simulation_failures_total",
        "Total number of simulator ticks that failed to write"
    );

    // Database
    describe_counter!("cityscope_db_errors_total", "Total database errors (by operation)");
}

/// Record the headline numbers of a finished cycle.
pub fn record_cycle_summary(predictions: usize) {
    gauge!("cityscope_last_cycle_predictions").set(predictions as f64);
}

pub fn record_simulation_tick(ok: bool) {
    counter!("cityscope_simulation_ticks_total").increment(1);
    if !ok {
        counter!("cityscope_simulation_failures_total").increment(1);
    }
}
