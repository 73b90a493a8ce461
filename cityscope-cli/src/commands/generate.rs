//! `cityscope generate` command

use super::open_state;
use anyhow::{Context, Result};
use cityscope_core::forecast::ModuleOutcome;
use cityscope_core::{
    spawn_event_recorder, Config, CycleTrigger, EventBus, Forecaster, StateManager,
};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "MODULE")]
    module: String,
    #[tabled(rename = "PREDICTIONS")]
    predictions: usize,
    #[tabled(rename = "SKIPPED")]
    skipped: usize,
    #[tabled(rename = "ANOMALIES")]
    anomalies: usize,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn outcome_row(outcome: &ModuleOutcome) -> OutcomeRow {
    OutcomeRow {
        module: outcome.module.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string()),
        predictions: outcome.predictions_created,
        skipped: outcome.series_skipped,
        anomalies: outcome.anomalies,
        status: match &outcome.error {
            None => "ok".green().to_string(),
            Some(e) => format!("failed: {}", e).red().to_string(),
        },
    }
}

/// Forecaster reading the same look-back window as the daemon.
fn configured_forecaster(state: StateManager, config: &Config, events: EventBus) -> Forecaster {
    Forecaster::new(Arc::new(state), events).with_window(config.window())
}

/// Run one prediction cycle against the database
pub async fn generate(db: Option<PathBuf>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let state = open_state(db).await?;

    let events = EventBus::new();
    let recorder = spawn_event_recorder(&events, state.clone());
    let forecaster = configured_forecaster(state, &config, events);

    let report = forecaster.generate_predictions(CycleTrigger::Manual).await;

    // Closing the bus lets the recorder drain and exit.
    drop(forecaster);
    recorder.await.context("Alert recorder stopped unexpectedly")?;

    let mut table = Table::new(report.outcomes.iter().map(outcome_row));
    table.with(Style::modern());
    println!("{}", table);

    if report.is_clean() {
        println!(
            "{} Generated {} predictions in {} ms",
            "✓".green().bold(),
            report.total_predictions(),
            report.duration.as_millis()
        );
    } else {
        println!(
            "{} Generated {} predictions; {} module(s) failed",
            "✗".red().bold(),
            report.total_predictions(),
            report.failed_modules().len()
        );
    }

    Ok(())
}
