//! `cityscope predictions` and `cityscope latest` commands

use super::{format_age, open_state};
use anyhow::{Context, Result};
use cityscope_core::types::now_ms;
use cityscope_core::{Module, Prediction};
use colored::Colorize;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "MODULE")]
    module: String,
    #[tabled(rename = "TYPE")]
    prediction_type: String,
    #[tabled(rename = "HORIZON")]
    horizon: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "CONFIDENCE")]
    confidence: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

/// List predictions, optionally for one module
pub async fn predictions(db: Option<PathBuf>, module: Option<Module>, limit: i64) -> Result<()> {
    let state = open_state(db).await?;
    let predictions =
        state.list_predictions(module, limit).await.context("Failed to list predictions")?;
    print_predictions(&predictions);
    Ok(())
}

/// Show the most recent predictions across all modules
pub async fn latest(db: Option<PathBuf>) -> Result<()> {
    let state = open_state(db).await?;
    let predictions = state.latest_predictions().await.context("Failed to list predictions")?;
    print_predictions(&predictions);
    Ok(())
}

fn print_predictions(predictions: &[Prediction]) {
    if predictions.is_empty() {
        println!("No predictions found.");
        println!();
        println!("Generate some with: {}", "cityscope generate".cyan());
        return;
    }

    let now = now_ms();
    let rows: Vec<PredictionRow> = predictions
        .iter()
        .map(|p| PredictionRow {
            id: p.id,
            module: p.module.to_string(),
            prediction_type: p.prediction_type.clone(),
            horizon: format!("{}h", p.time_horizon_hours),
            value: format!("{:.2}", p.predicted_value),
            confidence: format_confidence(p.confidence),
            detail: p.metadata.values().cloned().collect::<Vec<_>>().join(", "),
            created: format_age(now - p.created_at_ms),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{}", table);
}

/// Confidence as a percentage, coloured by strength.
fn format_confidence(confidence: f64) -> String {
    let text = format!("{:.0}%", confidence * 100.0);
    if confidence >= 0.7 {
        text.green().to_string()
    } else if confidence >= 0.4 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_confidence_text() {
        colored::control::set_override(false);
        assert_eq!(format_confidence(0.9), "90%");
        assert_eq!(format_confidence(0.1), "10%");
    }
}
