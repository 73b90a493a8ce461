//! System alerts and the activity feed.
//!
//! Both carry an optional [`Module`]; `None` means the record concerns the
//! system as a whole and is stored as `"system"`.

use crate::error::CityError;
use crate::types::Module;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Column value for records that are not tied to one module.
pub const SYSTEM_SCOPE: &str = "system";

/// Render an optional module the way the alert and activity tables store it.
pub fn scope_str(module: Option<Module>) -> &'static str {
    module.map(|m| m.as_str()).unwrap_or(SYSTEM_SCOPE)
}

/// Parse a stored scope column back into an optional module.
pub fn parse_scope(s: &str) -> Result<Option<Module>, CityError> {
    if s == SYSTEM_SCOPE {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Alert category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Warning,
    Info,
    Success,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Error => "error",
            AlertKind::Warning => "warning",
            AlertKind::Info => "info",
            AlertKind::Success => "success",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(AlertKind::Error),
            "warning" => Ok(AlertKind::Warning),
            "info" => Ok(AlertKind::Info),
            "success" => Ok(AlertKind::Success),
            _ => Err(CityError::InvalidInput { reason: format!("unknown alert kind '{}'", s) }),
        }
    }
}

/// How urgently an alert needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(AlertSeverity::Low),
            "medium" => Ok(AlertSeverity::Medium),
            "high" => Ok(AlertSeverity::High),
            "critical" => Ok(AlertSeverity::Critical),
            _ => {
                Err(CityError::InvalidInput { reason: format!("unknown alert severity '{}'", s) })
            }
        }
    }
}

/// An alert to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub module: Option<Module>,
    pub severity: AlertSeverity,
}

/// A recorded alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub module: Option<Module>,
    pub severity: AlertSeverity,
    pub resolved: bool,
    pub created_at_ms: i64,
    pub resolved_at_ms: Option<i64>,
}

/// An activity feed entry to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    /// Dotted action name, e.g. "forecast.cycle_completed".
    pub action: String,
    pub module: Option<Module>,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

/// A recorded activity feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub action: String,
    pub module: Option<Module>,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub created_at_ms: i64,
}
