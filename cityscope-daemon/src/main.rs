use anyhow::Context;
use cityscope_core::observability::health::{DATABASE, FORECASTER, SIMULATOR};
use cityscope_core::{
    init_observability, shutdown_observability, spawn_event_recorder, Config, EventBus,
    Forecaster, HealthChecker, Simulator, StateManager,
};
use std::sync::Arc;
use tracing::info;

mod service;
mod shutdown;

use service::{CityService, Schedule};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize observability FIRST
    init_observability("cityscoped", Some(config.metrics_port))
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;

    info!("cityscope daemon starting");

    let health = HealthChecker::new();
    health.register_subsystem("daemon").await;

    let state = StateManager::new(&config.db_path)
        .await
        .context("Failed to initialize state manager")?;
    health.register_subsystem(DATABASE).await;

    let events = EventBus::new();
    let recorder = spawn_event_recorder(&events, state.clone());

    let forecaster =
        Forecaster::new(Arc::new(state.clone()), events).with_window(config.window());
    health.register_subsystem(FORECASTER).await;

    let simulator = if config.simulation_enabled {
        health.register_subsystem(SIMULATOR).await;
        Some(Simulator::new(state.clone()))
    } else {
        info!("Data simulation disabled");
        None
    };

    let mut service = CityService::new(forecaster, simulator, health, Schedule::from(&config));
    service.start();
    info!("cityscope daemon ready");

    let mut shutdown_rx = shutdown::shutdown_signal();
    let stop_requested = async move {
        let _ = shutdown_rx.recv().await;
    };
    service.serve(stop_requested, shutdown::regenerate_signal()).await;

    info!("cityscope daemon shutting down");
    service.stop().await;
    recorder.abort();
    state.pool().close().await;

    shutdown_observability();
    Ok(())
}
