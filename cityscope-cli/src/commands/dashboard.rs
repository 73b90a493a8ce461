//! `cityscope dashboard` command

use super::open_state;
use anyhow::{Context, Result};
use cityscope_core::types::AirQuality;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

fn air_quality_label(quality: AirQuality) -> ColoredString {
    match quality {
        AirQuality::Good => quality.as_str().green(),
        AirQuality::Moderate => quality.as_str().yellow(),
        AirQuality::Poor => quality.as_str().red(),
        AirQuality::Unhealthy => quality.as_str().red().bold(),
    }
}

/// Print headline city metrics
pub async fn dashboard(db: Option<PathBuf>) -> Result<()> {
    let state = open_state(db).await?;
    let metrics = state.dashboard_metrics().await.context("Failed to load dashboard metrics")?;

    println!("{}", "City dashboard".bold());
    println!("  Population:          {}", metrics.total_population);
    println!("  Energy consumption:  {:.1} MW", metrics.energy_consumption);
    println!("  Traffic flow (24h):  {:.1}%", metrics.traffic_flow);
    println!("  Air quality:         {}", air_quality_label(metrics.air_quality));
    let alerts = metrics.alert_count.to_string();
    let alerts = if metrics.alert_count > 0 { alerts.yellow() } else { alerts.normal() };
    println!("  Open alerts:         {}", alerts);
    println!("  Predictions:         {}", metrics.prediction_count);

    Ok(())
}
