//! Subsystem health tracking.

use crate::forecast::CycleReport;
use crate::types::now_ms;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Subsystem name the forecaster reports under.
pub const FORECASTER: &str = "forecaster";
pub const SIMULATOR: &str = "simulator";
pub const DATABASE: &str = "database";

/// Overall system health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub version: &'static str,
    pub subsystems: Vec<SubsystemHealth>,
}

/// Subsystem health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    /// Unix milliseconds of the last status change.
    pub updated_at_ms: i64,
}

/// Health checker that tracks subsystem status.
#[derive(Clone)]
pub struct HealthChecker {
    subsystems: Arc<RwLock<Vec<SubsystemHealth>>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self { subsystems: Arc::new(RwLock::new(Vec::new())) }
    }

    /// Register a subsystem for health tracking. Registering twice is a no-op.
    pub async fn register_subsystem(&self, name: &str) {
        let mut subsystems = self.subsystems.write().await;
        if subsystems.iter().any(|s| s.name == name) {
            return;
        }
        subsystems.push(SubsystemHealth {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message: None,
            updated_at_ms: now_ms(),
        });
    }

    /// Update subsystem health status.
    pub async fn update_subsystem(&self, name: &str, status: HealthStatus, message: Option<String>) {
        let mut subsystems = self.subsystems.write().await;
        if let Some(subsystem) = subsystems.iter_mut().find(|s| s.name == name) {
            subsystem.status = status;
            subsystem.message = message;
            subsystem.updated_at_ms = now_ms();
        }
    }

    /// Reflect a finished generation cycle on the forecaster subsystem.
    ///
    /// Any failed module degrades it; a clean cycle restores it.
    pub async fn record_cycle(&self, report: &CycleReport) {
        let failed = report.failed_modules();
        if failed.is_empty() {
            self.update_subsystem(FORECASTER, HealthStatus::Healthy, None).await;
        } else {
            let names: Vec<&str> = failed.iter().map(|m| m.as_str()).collect();
            self.update_subsystem(
                FORECASTER,
                HealthStatus::Degraded,
                Some(format!("last cycle failed for: {}", names.join(", "))),
            )
            .await;
        }
    }

    /// Get overall health status.
    ///
    /// Returns:
    /// - Healthy: All subsystems healthy
    /// - Degraded: At least one subsystem degraded, none unhealthy
    /// - Unhealthy: At least one subsystem unhealthy
    pub async fn get_health(&self) -> HealthCheck {
        let subsystems = self.subsystems.read().await.clone();

        let status = if subsystems.iter().any(|s| s.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if subsystems.iter().any(|s| s.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthCheck { status, version: env!("CARGO_PKG_VERSION"), subsystems }
    }

    /// Readiness check - are all subsystems healthy?
    pub async fn is_ready(&self) -> bool {
        self.get_health().await.status == HealthStatus::Healthy
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
