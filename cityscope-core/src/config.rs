//! Configuration management.

use crate::error::{CityError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Persistent configuration for cityscope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: String,
    pub metrics_port: u16,
    pub forecast_interval_secs: u64,
    pub bootstrap_delay_secs: u64,
    pub window_hours: u64,
    pub simulation_enabled: bool,
    pub simulation_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: paths::db_path().to_string_lossy().to_string(),
            metrics_port: 41102,
            forecast_interval_secs: 3600,
            bootstrap_delay_secs: 60,
            window_hours: 24,
            simulation_enabled: true,
            simulation_interval_secs: 30,
        }
    }
}

impl Config {
    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        paths::config_dir().join("config.json")
    }

    /// Load configuration from disk.
    ///
    /// A missing file yields the defaults. `CITYSCOPE_DB_PATH` overrides the
    /// stored database path either way.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(db_path) = std::env::var("CITYSCOPE_DB_PATH") {
            config.db_path = db_path;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path without env overrides.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CityError::InvalidConfig {
            reason: format!("Failed to read config: {}", e),
        })?;
        serde_json::from_str(&content).map_err(|e| CityError::InvalidConfig {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CityError::IoError { path: parent.to_path_buf(), source: e })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| CityError::InvalidConfig {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(&path, content).map_err(|e| CityError::IoError { path, source: e })
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.forecast_interval_secs == 0 {
            return Err(CityError::InvalidConfig {
                reason: "forecast_interval_secs must be greater than zero".to_string(),
            });
        }
        if self.simulation_interval_secs == 0 {
            return Err(CityError::InvalidConfig {
                reason: "simulation_interval_secs must be greater than zero".to_string(),
            });
        }
        if self.window_hours == 0 {
            return Err(CityError::InvalidConfig {
                reason: "window_hours must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn forecast_interval(&self) -> Duration {
        Duration::from_secs(self.forecast_interval_secs)
    }

    pub fn bootstrap_delay(&self) -> Duration {
        Duration::from_secs(self.bootstrap_delay_secs)
    }

    pub fn simulation_interval(&self) -> Duration {
        Duration::from_secs(self.simulation_interval_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_hours * 3600)
    }
}
