//! `cityscope alerts`, `cityscope resolve` and `cityscope activity` commands

use super::{format_age, open_state};
use anyhow::{Context, Result};
use cityscope_core::types::{now_ms, Activity, Alert, AlertKind, AlertSeverity, NewActivity};
use cityscope_core::Module;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "SEVERITY")]
    severity: String,
    #[tabled(rename = "MODULE")]
    module: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "MESSAGE")]
    message: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "MODULE")]
    module: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "WHEN")]
    when: String,
}

fn format_kind(kind: AlertKind) -> String {
    match kind {
        AlertKind::Error => kind.as_str().red().to_string(),
        AlertKind::Warning => kind.as_str().yellow().to_string(),
        AlertKind::Info => kind.as_str().cyan().to_string(),
        AlertKind::Success => kind.as_str().green().to_string(),
    }
}

fn format_severity(severity: AlertSeverity) -> String {
    match severity {
        AlertSeverity::Critical => severity.as_str().red().bold().to_string(),
        AlertSeverity::High => severity.as_str().red().to_string(),
        AlertSeverity::Medium => severity.as_str().yellow().to_string(),
        AlertSeverity::Low => severity.as_str().to_string(),
    }
}

fn scope(module: Option<Module>) -> String {
    module.map(|m| m.to_string()).unwrap_or_else(|| "system".to_string())
}

/// List alerts, newest first
pub async fn alerts(db: Option<PathBuf>, unresolved: bool, limit: i64) -> Result<()> {
    let state = open_state(db).await?;
    let alerts = if unresolved {
        state.unresolved_alerts().await
    } else {
        state.list_alerts(limit).await
    }
    .context("Failed to list alerts")?;

    if alerts.is_empty() {
        println!("No alerts found.");
        return Ok(());
    }

    let now = now_ms();
    let rows: Vec<AlertRow> = alerts.iter().map(|a| alert_row(a, now)).collect();
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{}", table);
    Ok(())
}

fn alert_row(alert: &Alert, now: i64) -> AlertRow {
    AlertRow {
        id: alert.id,
        kind: format_kind(alert.kind),
        severity: format_severity(alert.severity),
        module: scope(alert.module),
        title: alert.title.clone(),
        message: alert.message.clone(),
        status: if alert.resolved {
            "resolved".green().to_string()
        } else {
            "open".yellow().to_string()
        },
        created: format_age(now - alert.created_at_ms),
    }
}

/// Mark an alert resolved and note it in the activity feed
pub async fn resolve(db: Option<PathBuf>, id: i64) -> Result<()> {
    let state = open_state(db).await?;
    state.resolve_alert(id).await.with_context(|| format!("Failed to resolve alert {}", id))?;

    let mut metadata = BTreeMap::new();
    metadata.insert("alert_id".to_string(), id.to_string());
    state
        .insert_activity(&NewActivity {
            action: "alert.resolved".to_string(),
            module: None,
            description: format!("Resolved alert {}", id),
            metadata,
        })
        .await
        .context("Failed to record activity")?;

    println!("{} Alert {} resolved", "✓".green().bold(), id.to_string().bold());
    Ok(())
}

/// Show the activity feed, newest first
pub async fn activity(db: Option<PathBuf>, limit: i64) -> Result<()> {
    let state = open_state(db).await?;
    let feed = state.list_activity(limit).await.context("Failed to list activity")?;

    if feed.is_empty() {
        println!("No activity recorded yet.");
        return Ok(());
    }

    let now = now_ms();
    let rows: Vec<ActivityRow> = feed.iter().map(|a| activity_row(a, now)).collect();
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{}", table);
    Ok(())
}

fn activity_row(activity: &Activity, now: i64) -> ActivityRow {
    ActivityRow {
        action: activity.action.clone(),
        module: scope(activity.module),
        description: activity.description.clone(),
        when: format_age(now - activity.created_at_ms),
    }
}
