//! `cityscope seed` command

use super::open_state;
use anyhow::{bail, Context, Result};
use cityscope_core::Simulator;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

/// Insert `ticks` rounds of simulated readings ending now, `interval_mins` apart
pub async fn seed(db: Option<PathBuf>, ticks: usize, interval_mins: u64) -> Result<()> {
    if interval_mins == 0 {
        bail!("--interval must be at least one minute");
    }

    let state = open_state(db).await?;
    let simulator = Simulator::new(state);

    let written = simulator
        .backfill(ticks, Duration::from_secs(interval_mins * 60))
        .await
        .context("Failed to insert simulated readings")?;

    println!(
        "{} Inserted {} readings over {} ticks",
        "✓".green().bold(),
        written.to_string().bold(),
        ticks
    );
    Ok(())
}
