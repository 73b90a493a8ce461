//! Scheduled forecasting and simulation for cityscoped.

use cityscope_core::forecast::{CycleReport, CycleTrigger, Forecaster};
use cityscope_core::observability::health::{HealthChecker, HealthStatus, SIMULATOR};
use cityscope_core::observability::metrics::{record_cycle_summary, record_simulation_tick};
use cityscope_core::{Config, PeriodicTask, Simulator};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Timer settings for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Delay before the first prediction cycle.
    pub bootstrap_delay: Duration,
    pub forecast_interval: Duration,
    pub simulation_interval: Duration,
}

impl From<&Config> for Schedule {
    fn from(config: &Config) -> Self {
        Self {
            bootstrap_delay: config.bootstrap_delay(),
            forecast_interval: config.forecast_interval(),
            simulation_interval: config.simulation_interval(),
        }
    }
}

/// Trigger for the nth run of the forecast timer.
fn trigger_for_run(run: u64) -> CycleTrigger {
    if run == 0 {
        CycleTrigger::Bootstrap
    } else {
        CycleTrigger::Scheduled
    }
}

/// Run one cycle and reflect it in health and metrics.
async fn run_cycle(
    forecaster: &Forecaster,
    health: &HealthChecker,
    trigger: CycleTrigger,
) -> CycleReport {
    let report = forecaster.generate_predictions(trigger).await;
    health.record_cycle(&report).await;
    record_cycle_summary(report.total_predictions());
    report
}

/// Owns the forecast and simulation timers.
pub struct CityService {
    forecaster: Forecaster,
    simulator: Option<Simulator>,
    health: HealthChecker,
    schedule: Schedule,
    tasks: Vec<PeriodicTask>,
}

impl CityService {
    pub fn new(
        forecaster: Forecaster,
        simulator: Option<Simulator>,
        health: HealthChecker,
        schedule: Schedule,
    ) -> Self {
        Self { forecaster, simulator, health, schedule, tasks: Vec::new() }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Start the timers. Calling this on a running service does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Service already started");
            return;
        }

        let forecaster = self.forecaster.clone();
        let health = self.health.clone();
        self.tasks.push(PeriodicTask::spawn(
            "forecast",
            self.schedule.bootstrap_delay,
            self.schedule.forecast_interval,
            move |run| {
                let forecaster = forecaster.clone();
                let health = health.clone();
                async move {
                    run_cycle(&forecaster, &health, trigger_for_run(run)).await;
                }
            },
        ));

        if let Some(simulator) = self.simulator.clone() {
            let health = self.health.clone();
            self.tasks.push(PeriodicTask::spawn(
                "simulation",
                Duration::ZERO,
                self.schedule.simulation_interval,
                move |_| {
                    let simulator = simulator.clone();
                    let health = health.clone();
                    async move {
                        match simulator.tick().await {
                            Ok(_) => {
                                record_simulation_tick(true);
                                health.update_subsystem(SIMULATOR, HealthStatus::Healthy, None).await;
                            }
                            Err(e) => {
                                warn!(error = %e, "Data simulation tick failed");
                                record_simulation_tick(false);
                                health
                                    .update_subsystem(
                                        SIMULATOR,
                                        HealthStatus::Degraded,
                                        Some(e.to_string()),
                                    )
                                    .await;
                            }
                        }
                    }
                },
            ));
        }

        info!(tasks = self.tasks.len(), "Service started");
    }

    /// Start a cycle now, outside the timer. It runs concurrently with any
    /// scheduled cycle.
    pub fn regenerate(&self) -> JoinHandle<CycleReport> {
        let forecaster = self.forecaster.clone();
        let health = self.health.clone();
        tokio::spawn(async move {
            let report = run_cycle(&forecaster, &health, CycleTrigger::Manual).await;
            info!(predictions = report.total_predictions(), "On-demand cycle finished");
            report
        })
    }

    /// Serve on-demand cycle requests until `shutdown` resolves.
    ///
    /// Requested cycles are spawned, so shutdown is never held up by one.
    pub async fn serve(
        &self,
        shutdown: impl Future<Output = ()>,
        mut requests: mpsc::Receiver<()>,
    ) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(()) = requests.recv() => {
                    info!("On-demand cycle requested");
                    let _ = self.regenerate();
                }
            }
        }
    }

    /// Stop all timers and wait for them to exit.
    pub async fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.stop().await;
        }
        info!("Service stopped");
    }
}
