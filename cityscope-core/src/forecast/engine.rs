//! Generation cycle.
//!
//! One cycle reads a look-back window per module, forecasts every series
//! with enough data and appends the predictions. Module procedures run as
//! independent tokio tasks; a failure in one is captured in the report and
//! never reaches the others.

use super::anomaly::detect_anomaly;
use super::combiner::{forecast, MIN_FORECAST_SAMPLES};
use super::store::{ForecastStore, MetricKey};
use super::{RENEWABLE_HORIZONS, STANDARD_HORIZONS};
use crate::error::{CityError, Result};
use crate::events::{Event, EventBus, EventType};
use crate::types::{now_ms, sanitize_readings, Module, NewPrediction, RawReading, Sample};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Default look-back window.
const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// What started a generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleTrigger {
    /// First run shortly after process start.
    Bootstrap,
    /// Recurring timer.
    Scheduled,
    /// Operator request.
    Manual,
}

impl CycleTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleTrigger::Bootstrap => "bootstrap",
            CycleTrigger::Scheduled => "scheduled",
            CycleTrigger::Manual => "manual",
        }
    }
}

impl fmt::Display for CycleTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one module's procedure within a cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleOutcome {
    pub module: Option<Module>,
    pub predictions_created: usize,
    /// Series left out for having fewer than five valid samples.
    pub series_skipped: usize,
    pub anomalies: usize,
    /// Set when the procedure failed; predictions written before the
    /// failure stay in the log.
    pub error: Option<String>,
}

impl ModuleOutcome {
    fn new(module: Module) -> Self {
        Self { module: Some(module), ..Default::default() }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a full generation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub trigger: CycleTrigger,
    /// Wall-clock instant the horizons were measured from.
    pub reference_ms: i64,
    pub duration: Duration,
    pub outcomes: Vec<ModuleOutcome>,
}

impl CycleReport {
    pub fn total_predictions(&self) -> usize {
        self.outcomes.iter().map(|o| o.predictions_created).sum()
    }

    pub fn failed_modules(&self) -> Vec<Module> {
        self.outcomes.iter().filter(|o| !o.succeeded()).filter_map(|o| o.module).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(ModuleOutcome::succeeded)
    }

    pub fn outcome(&self, module: Module) -> Option<&ModuleOutcome> {
        self.outcomes.iter().find(|o| o.module == Some(module))
    }
}

/// Time bounds shared by every module in one cycle.
#[derive(Debug, Clone, Copy)]
struct CycleWindow {
    start_ms: i64,
    end_ms: i64,
}

/// One series to forecast and how to label its predictions.
struct Series<'a> {
    module: Module,
    prediction_type: &'static str,
    horizons: &'static [u32],
    metadata: (&'static str, &'a str),
}

/// Runs generation cycles against a [`ForecastStore`].
#[derive(Clone)]
pub struct Forecaster {
    store: Arc<dyn ForecastStore>,
    events: EventBus,
    window: Duration,
}

impl Forecaster {
    pub fn new(store: Arc<dyn ForecastStore>, events: EventBus) -> Self {
        Self { store, events, window: DEFAULT_WINDOW }
    }

    /// Override the look-back window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Look-back window each cycle reads.
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Run one generation cycle measured from the current wall clock.
    pub async fn generate_predictions(&self, trigger: CycleTrigger) -> CycleReport {
        self.generate_predictions_at(trigger, now_ms()).await
    }

    /// Run one generation cycle with horizons measured from `reference_ms`.
    ///
    /// Every forecasted module runs in its own task. The call returns once
    /// all of them have settled, successfully or not.
    #[instrument(skip_all, fields(trigger = %trigger))]
    pub async fn generate_predictions_at(
        &self,
        trigger: CycleTrigger,
        reference_ms: i64,
    ) -> CycleReport {
        let started = Instant::now();
        info!("Generating predictions");
        metrics::counter!("cityscope_forecast_cycles_total", "trigger" => trigger.as_str())
            .increment(1);
        self.events.publish(
            Event::new(EventType::CycleStarted, format!("{} cycle started", trigger))
                .with_metadata("trigger", trigger),
        );

        let window =
            CycleWindow { start_ms: reference_ms - self.window.as_millis() as i64, end_ms: reference_ms };

        let tasks: Vec<_> = Module::FORECASTED
            .iter()
            .map(|&module| {
                let forecaster = self.clone();
                let handle = tokio::spawn(async move {
                    forecaster.run_module(module, window, reference_ms).await
                });
                (module, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (module, handle) in tasks {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let err = CityError::TaskFailed {
                        module: module.to_string(),
                        reason: e.to_string(),
                    };
                    let mut outcome = ModuleOutcome::new(module);
                    self.record_failure(&mut outcome, module, &err);
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        let report =
            CycleReport { trigger, reference_ms, duration: started.elapsed(), outcomes };

        metrics::histogram!("cityscope_forecast_cycle_duration_seconds")
            .record(report.duration.as_secs_f64());
        self.events.publish(
            Event::new(
                EventType::CycleCompleted,
                format!("{} predictions generated", report.total_predictions()),
            )
            .with_metadata("trigger", trigger)
            .with_metadata("failed_modules", report.failed_modules().len()),
        );
        info!(
            predictions = report.total_predictions(),
            failed = report.failed_modules().len(),
            duration_ms = report.duration.as_millis() as u64,
            "Prediction generation completed"
        );

        report
    }

    /// Run one module's procedure, converting its error into the outcome.
    async fn run_module(&self, module: Module, window: CycleWindow, now: i64) -> ModuleOutcome {
        let mut outcome = ModuleOutcome::new(module);
        let result = match module {
            Module::Traffic => self.forecast_traffic(&mut outcome, window, now).await,
            Module::Energy => self.forecast_energy(&mut outcome, window, now).await,
            Module::Environmental => self.forecast_environmental(&mut outcome, window, now).await,
            Module::Population => Ok(()),
        };

        match result {
            Ok(()) => {
                info!(module = %module, created = outcome.predictions_created, "Generated predictions");
            }
            Err(e) => self.record_failure(&mut outcome, module, &e),
        }
        outcome
    }

    fn record_failure(&self, outcome: &mut ModuleOutcome, module: Module, err: &CityError) {
        error!(module = %module, error = %err, "Error generating predictions");
        metrics::counter!("cityscope_forecast_module_failures_total", "module" => module.as_str())
            .increment(1);
        self.events.publish(
            Event::new(EventType::ModuleFailed, err.to_string()).with_module(module),
        );
        outcome.error = Some(err.to_string());
    }

    #[instrument(skip(self, outcome))]
    async fn forecast_traffic(
        &self,
        outcome: &mut ModuleOutcome,
        window: CycleWindow,
        now: i64,
    ) -> Result<()> {
        let readings = self.fetch(MetricKey::TrafficFlow, window).await?;
        if readings.is_empty() {
            debug!("No traffic readings in window, skipping");
            return Ok(());
        }

        let mut by_location: BTreeMap<&str, Vec<&RawReading>> = BTreeMap::new();
        for reading in &readings {
            let location = reading.group.as_deref().unwrap_or("unknown");
            by_location.entry(location).or_default().push(reading);
        }

        for (location, group) in by_location {
            let samples = sanitize_readings(&format!("traffic:{}", location), group);
            let series = Series {
                module: Module::Traffic,
                prediction_type: "flow",
                horizons: &STANDARD_HORIZONS,
                metadata: ("location", location),
            };
            self.forecast_series(outcome, &series, &samples, now).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, outcome))]
    async fn forecast_energy(
        &self,
        outcome: &mut ModuleOutcome,
        window: CycleWindow,
        now: i64,
    ) -> Result<()> {
        let consumption = self.fetch(MetricKey::EnergyConsumption, window).await?;
        let renewable = self.fetch(MetricKey::EnergyRenewable, window).await?;
        if consumption.is_empty() && renewable.is_empty() {
            debug!("No energy readings in window, skipping");
            return Ok(());
        }

        let samples = sanitize_readings("energy:total_consumption", &consumption);
        let series = Series {
            module: Module::Energy,
            prediction_type: "demand",
            horizons: &STANDARD_HORIZONS,
            metadata: ("type", "total_consumption"),
        };
        self.forecast_series(outcome, &series, &samples, now).await?;

        let samples = sanitize_readings("energy:renewable_percentage", &renewable);
        let series = Series {
            module: Module::Energy,
            prediction_type: "renewable",
            horizons: &RENEWABLE_HORIZONS,
            metadata: ("type", "renewable_percentage"),
        };
        self.forecast_series(outcome, &series, &samples, now).await
    }

    #[instrument(skip(self, outcome))]
    async fn forecast_environmental(
        &self,
        outcome: &mut ModuleOutcome,
        window: CycleWindow,
        now: i64,
    ) -> Result<()> {
        let readings = self.fetch(MetricKey::AirQualityIndex, window).await?;
        if readings.is_empty() {
            debug!("No environmental readings in window, skipping");
            return Ok(());
        }

        let samples = sanitize_readings("environmental:air_quality_index", &readings);
        let series = Series {
            module: Module::Environmental,
            prediction_type: "quality",
            horizons: &STANDARD_HORIZONS,
            metadata: ("type", "air_quality_index"),
        };
        self.forecast_series(outcome, &series, &samples, now).await
    }

    async fn fetch(&self, key: MetricKey, window: CycleWindow) -> Result<Vec<RawReading>> {
        self.store.fetch_window(key, window.start_ms, window.end_ms).await
    }

    /// Forecast every horizon of one series and append the results in order.
    async fn forecast_series(
        &self,
        outcome: &mut ModuleOutcome,
        series: &Series<'_>,
        samples: &[Sample],
        now: i64,
    ) -> Result<()> {
        let (meta_key, meta_value) = series.metadata;

        if samples.len() < MIN_FORECAST_SAMPLES {
            debug!(
                module = %series.module,
                series = meta_value,
                samples = samples.len(),
                "Not enough samples to forecast"
            );
            outcome.series_skipped += 1;
            return Ok(());
        }

        self.check_anomaly(outcome, series, samples);

        for &hours in series.horizons {
            let result = forecast(samples, hours, now);
            let prediction = NewPrediction::new(
                series.module,
                series.prediction_type,
                result.value,
                result.confidence,
                hours,
            )
            .with_metadata(meta_key, meta_value);

            let stored = self.store.append_prediction(&prediction).await?;
            outcome.predictions_created += 1;
            metrics::counter!("cityscope_predictions_created_total", "module" => series.module.as_str())
                .increment(1);
            self.events.publish(
                Event::new(
                    EventType::PredictionCreated,
                    format!("{} {}h: {:.2}", series.prediction_type, hours, stored.predicted_value),
                )
                .with_module(series.module)
                .with_metadata("prediction_id", stored.id)
                .with_metadata(meta_key, meta_value),
            );
        }
        Ok(())
    }

    fn check_anomaly(&self, outcome: &mut ModuleOutcome, series: &Series<'_>, samples: &[Sample]) {
        let check = detect_anomaly(samples);
        if !check.is_anomaly {
            return;
        }

        let (meta_key, meta_value) = series.metadata;
        let latest = samples[samples.len() - 1].value;
        warn!(
            module = %series.module,
            series = meta_value,
            latest,
            threshold = check.threshold,
            "Latest sample exceeds anomaly threshold"
        );
        outcome.anomalies += 1;
        metrics::counter!("cityscope_anomalies_detected_total", "module" => series.module.as_str())
            .increment(1);
        self.events.publish(
            Event::new(
                EventType::AnomalyDetected,
                format!("{} {} above {:.2}", series.prediction_type, latest, check.threshold),
            )
            .with_module(series.module)
            .with_metadata(meta_key, meta_value)
            .with_metadata("threshold", check.threshold)
            .with_metadata("latest", latest),
        );
    }
}
