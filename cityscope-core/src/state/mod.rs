//! State management with SQLite persistence.
//!
//! The StateManager handles all persistent state for cityscope:
//! - Traffic, energy, environmental and population readings
//! - The append-only prediction log
//! - System alerts and the activity feed
//! - Range exports and dashboard summary queries

use crate::error::{CityError, Result};
use crate::forecast::{ForecastStore, MetricKey};
use crate::types::alert::{parse_scope, scope_str};
use crate::types::{
    now_ms, Activity, AirQuality, Alert, DashboardMetrics, EnergyReading, EnvironmentalReading,
    Module, NewActivity, NewAlert, NewPrediction, PopulationReading, Prediction, RawReading,
    ReadingExport, TrafficReading, HOUR_MS,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, Row};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument};

pub mod migrations;

#[cfg(test)]
mod tests;

/// Default number of predictions returned by [`StateManager::list_predictions`].
pub const DEFAULT_PREDICTION_LIMIT: i64 = 50;

/// Number of predictions returned by [`StateManager::latest_predictions`].
pub const LATEST_PREDICTION_LIMIT: i64 = 10;

/// Default number of records returned by the alert and activity listings.
pub const DEFAULT_FEED_LIMIT: i64 = 50;

/// State manager for persistent storage.
#[derive(Clone)]
pub struct StateManager {
    pool: SqlitePool,
}

impl StateManager {
    /// Create a new StateManager with an in-memory database (for tests).
    pub async fn new_in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    /// Get a reference to the underlying SQLite pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a new StateManager with a database at the specified path.
    #[instrument(skip(db_path))]
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        info!("Initializing state manager at {:?}", db_path);

        let in_memory = db_path == Path::new(":memory:");
        if !in_memory {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CityError::IoError { path: parent.to_path_buf(), source: e })?;
            }
        }

        let mut options = SqliteConnectOptions::from_str(db_path.to_str().ok_or_else(|| {
            CityError::InvalidConfig { reason: "Invalid database path".to_string() }
        })?)
        .map_err(|e| CityError::DatabaseError(e.to_string()))?;

        options = options.create_if_missing(true).log_statements(tracing::log::LevelFilter::Debug);

        // Every connection to ":memory:" is its own database.
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| CityError::DatabaseError(e.to_string()))?;

        let manager = Self { pool };
        manager.run_migrations().await?;

        info!("State manager initialized successfully");
        Ok(manager)
    }

    #[instrument(skip(self))]
    async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        migrations::run(&self.pool).await?;
        info!("Database migrations complete");
        Ok(())
    }

    // ========================
    // Reading Operations
    // ========================

    /// Insert a traffic reading.
    #[instrument(skip(self, reading), fields(location = %reading.location))]
    pub async fn insert_traffic(&self, reading: &TrafficReading) -> Result<i64> {
        let now = now_ms();
        let result = sqlx::query(
            r#"
            INSERT INTO traffic_data (timestamp, location, flow_rate, congestion_level,
                                      average_speed, vehicle_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.timestamp_ms.unwrap_or(now))
        .bind(&reading.location)
        .bind(reading.flow_rate)
        .bind(&reading.congestion_level)
        .bind(reading.average_speed)
        .bind(reading.vehicle_count)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_traffic", e))?;

        Ok(result.last_insert_rowid())
    }

    /// Insert an energy reading.
    #[instrument(skip(self, reading))]
    pub async fn insert_energy(&self, reading: &EnergyReading) -> Result<i64> {
        let now = now_ms();
        let result = sqlx::query(
            r#"
            INSERT INTO energy_data (timestamp, total_consumption, renewable_percentage,
                                     solar_output, wind_output, grid_load, peak_demand, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.timestamp_ms.unwrap_or(now))
        .bind(reading.total_consumption)
        .bind(reading.renewable_percentage)
        .bind(reading.solar_output)
        .bind(reading.wind_output)
        .bind(reading.grid_load)
        .bind(reading.peak_demand)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_energy", e))?;

        Ok(result.last_insert_rowid())
    }

    /// Insert an environmental reading.
    #[instrument(skip(self, reading))]
    pub async fn insert_environmental(&self, reading: &EnvironmentalReading) -> Result<i64> {
        let now = now_ms();
        let result = sqlx::query(
            r#"
            INSERT INTO environmental_data (timestamp, air_quality_index, pm25, pm10,
                                            temperature, humidity, noise_level, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.timestamp_ms.unwrap_or(now))
        .bind(reading.air_quality_index)
        .bind(reading.pm25)
        .bind(reading.pm10)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.noise_level)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_environmental", e))?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a population snapshot.
    #[instrument(skip(self, reading))]
    pub async fn insert_population(&self, reading: &PopulationReading) -> Result<i64> {
        let now = now_ms();
        let demographics = reading
            .demographics
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| {
                CityError::DatabaseError(format!("Failed to serialize demographics: {}", e))
            })?;

        let result = sqlx::query(
            r#"
            INSERT INTO population_data (timestamp, total_population, active_users,
                                         growth_rate, demographics, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.timestamp_ms.unwrap_or(now))
        .bind(reading.total_population)
        .bind(reading.active_users)
        .bind(reading.growth_rate)
        .bind(demographics)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_population", e))?;

        Ok(result.last_insert_rowid())
    }

    /// Readings of one metric within `[start_ms, end_ms]`, newest first.
    #[instrument(skip(self))]
    pub async fn readings_in_range(
        &self,
        key: MetricKey,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawReading>> {
        let sql = match key {
            MetricKey::TrafficFlow => {
                r#"
                SELECT timestamp, flow_rate AS value, location AS grp
                FROM traffic_data
                WHERE timestamp >= ? AND timestamp <= ?
                ORDER BY timestamp DESC
                "#
            }
            MetricKey::EnergyConsumption => {
                r#"
                SELECT timestamp, total_consumption AS value, NULL AS grp
                FROM energy_data
                WHERE timestamp >= ? AND timestamp <= ?
                ORDER BY timestamp DESC
                "#
            }
            MetricKey::EnergyRenewable => {
                r#"
                SELECT timestamp, renewable_percentage AS value, NULL AS grp
                FROM energy_data
                WHERE timestamp >= ? AND timestamp <= ?
                ORDER BY timestamp DESC
                "#
            }
            MetricKey::AirQualityIndex => {
                r#"
                SELECT timestamp, CAST(air_quality_index AS REAL) AS value, NULL AS grp
                FROM environmental_data
                WHERE timestamp >= ? AND timestamp <= ?
                ORDER BY timestamp DESC
                "#
            }
        };

        let rows = sqlx::query(sql)
            .bind(start_ms)
            .bind(end_ms)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CityError::database("readings_in_range", e))?;

        Ok(rows
            .into_iter()
            .map(|row| RawReading {
                timestamp_ms: row.get::<Option<i64>, _>("timestamp"),
                value: row.get::<f64, _>("value"),
                group: row.get::<Option<String>, _>("grp"),
            })
            .collect())
    }

    /// Every reading of `module` within `[start_ms, end_ms]`, newest first.
    #[instrument(skip(self))]
    pub async fn export_readings(
        &self,
        module: Module,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<ReadingExport> {
        if start_ms > end_ms {
            return Err(CityError::InvalidInput {
                reason: format!("export range start {} is after end {}", start_ms, end_ms),
            });
        }

        let export = match module {
            Module::Traffic => {
                ReadingExport::Traffic(self.traffic_between(start_ms, end_ms).await?)
            }
            Module::Energy => ReadingExport::Energy(self.energy_between(start_ms, end_ms).await?),
            Module::Environmental => {
                ReadingExport::Environmental(self.environmental_between(start_ms, end_ms).await?)
            }
            Module::Population => {
                ReadingExport::Population(self.population_between(start_ms, end_ms).await?)
            }
        };

        info!(module = %module, rows = export.len(), "Exported readings");
        Ok(export)
    }

    async fn traffic_between(&self, start_ms: i64, end_ms: i64) -> Result<Vec<TrafficReading>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM traffic_data
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("export_traffic", e))?;

        Ok(rows
            .into_iter()
            .map(|row| TrafficReading {
                timestamp_ms: row.get("timestamp"),
                location: row.get("location"),
                flow_rate: row.get("flow_rate"),
                congestion_level: row.get("congestion_level"),
                average_speed: row.get("average_speed"),
                vehicle_count: row.get("vehicle_count"),
            })
            .collect())
    }

    async fn energy_between(&self, start_ms: i64, end_ms: i64) -> Result<Vec<EnergyReading>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM energy_data
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("export_energy", e))?;

        Ok(rows
            .into_iter()
            .map(|row| EnergyReading {
                timestamp_ms: row.get("timestamp"),
                total_consumption: row.get("total_consumption"),
                renewable_percentage: row.get("renewable_percentage"),
                solar_output: row.get("solar_output"),
                wind_output: row.get("wind_output"),
                grid_load: row.get("grid_load"),
                peak_demand: row.get("peak_demand"),
            })
            .collect())
    }

    async fn environmental_between(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<EnvironmentalReading>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM environmental_data
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("export_environmental", e))?;

        Ok(rows
            .into_iter()
            .map(|row| EnvironmentalReading {
                timestamp_ms: row.get("timestamp"),
                air_quality_index: row.get("air_quality_index"),
                pm25: row.get("pm25"),
                pm10: row.get("pm10"),
                temperature: row.get("temperature"),
                humidity: row.get("humidity"),
                noise_level: row.get("noise_level"),
            })
            .collect())
    }

    async fn population_between(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<PopulationReading>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM population_data
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("export_population", e))?;

        rows.into_iter()
            .map(|row| -> Result<PopulationReading> {
                let demographics: Option<serde_json::Value> = row
                    .get::<Option<String>, _>("demographics")
                    .map(|json| serde_json::from_str(&json))
                    .transpose()
                    .map_err(|e| {
                        CityError::DatabaseError(format!(
                            "Failed to deserialize demographics: {}",
                            e
                        ))
                    })?;

                Ok(PopulationReading {
                    timestamp_ms: row.get("timestamp"),
                    total_population: row.get("total_population"),
                    active_users: row.get("active_users"),
                    growth_rate: row.get("growth_rate"),
                    demographics,
                })
            })
            .collect()
    }

    // ========================
    // Prediction Operations
    // ========================

    /// Append a prediction to the log.
    #[instrument(skip(self, prediction), fields(module = %prediction.module))]
    pub async fn insert_prediction(&self, prediction: &NewPrediction) -> Result<Prediction> {
        let metadata_json = serde_json::to_string(&prediction.metadata).map_err(|e| {
            CityError::DatabaseError(format!("Failed to serialize metadata: {}", e))
        })?;
        let created_at_ms = now_ms();

        let result = sqlx::query(
            r#"
            INSERT INTO predictions (module, prediction_type, predicted_value, confidence,
                                     time_horizon, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(prediction.module.as_str())
        .bind(&prediction.prediction_type)
        .bind(prediction.predicted_value)
        .bind(prediction.confidence)
        .bind(prediction.time_horizon_hours as i64)
        .bind(metadata_json)
        .bind(created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_prediction", e))?;

        Ok(Prediction {
            id: result.last_insert_rowid(),
            module: prediction.module,
            prediction_type: prediction.prediction_type.clone(),
            predicted_value: prediction.predicted_value,
            confidence: prediction.confidence,
            time_horizon_hours: prediction.time_horizon_hours,
            metadata: prediction.metadata.clone(),
            created_at_ms,
        })
    }

    /// Most recent predictions first, optionally for one module.
    #[instrument(skip(self))]
    pub async fn list_predictions(
        &self,
        module: Option<Module>,
        limit: i64,
    ) -> Result<Vec<Prediction>> {
        let rows = match module {
            Some(module) => {
                sqlx::query(
                    r#"
                    SELECT * FROM predictions
                    WHERE module = ?
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?
                    "#,
                )
                .bind(module.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM predictions ORDER BY created_at DESC, id DESC LIMIT ?")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| CityError::database("list_predictions", e))?;

        rows.into_iter().map(|row| self.row_to_prediction(row)).collect()
    }

    /// The ten most recent predictions across all modules.
    pub async fn latest_predictions(&self) -> Result<Vec<Prediction>> {
        self.list_predictions(None, LATEST_PREDICTION_LIMIT).await
    }

    /// Total number of predictions in the log.
    pub async fn count_predictions(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CityError::database("count_predictions", e))
    }

    fn row_to_prediction(&self, row: sqlx::sqlite::SqliteRow) -> Result<Prediction> {
        let module_str: String = row.get("module");
        let module = Module::from_str(&module_str)
            .map_err(|e| CityError::DatabaseError(format!("Corrupt prediction row: {}", e)))?;

        let metadata_json: String = row.get("metadata");
        let metadata = serde_json::from_str(&metadata_json).map_err(|e| {
            CityError::DatabaseError(format!("Failed to deserialize metadata: {}", e))
        })?;

        Ok(Prediction {
            id: row.get("id"),
            module,
            prediction_type: row.get("prediction_type"),
            predicted_value: row.get("predicted_value"),
            confidence: row.get("confidence"),
            time_horizon_hours: row.get::<i64, _>("time_horizon") as u32,
            metadata,
            created_at_ms: row.get("created_at"),
        })
    }

    // ========================
    // Alert Operations
    // ========================

    /// Record a new, unresolved alert.
    #[instrument(skip(self, alert), fields(title = %alert.title))]
    pub async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert> {
        let created_at_ms = now_ms();
        let result = sqlx::query(
            r#"
            INSERT INTO system_alerts (kind, title, message, module, severity, resolved, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(alert.kind.as_str())
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(scope_str(alert.module))
        .bind(alert.severity.as_str())
        .bind(created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_alert", e))?;

        Ok(Alert {
            id: result.last_insert_rowid(),
            kind: alert.kind,
            title: alert.title.clone(),
            message: alert.message.clone(),
            module: alert.module,
            severity: alert.severity,
            resolved: false,
            created_at_ms,
            resolved_at_ms: None,
        })
    }

    /// Most recent alerts first, resolved or not.
    #[instrument(skip(self))]
    pub async fn list_alerts(&self, limit: i64) -> Result<Vec<Alert>> {
        let rows = sqlx::query(
            "SELECT * FROM system_alerts ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("list_alerts", e))?;

        rows.into_iter().map(|row| self.row_to_alert(row)).collect()
    }

    /// Every unresolved alert, most recent first.
    #[instrument(skip(self))]
    pub async fn unresolved_alerts(&self) -> Result<Vec<Alert>> {
        let rows = sqlx::query(
            "SELECT * FROM system_alerts WHERE resolved = 0 ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("unresolved_alerts", e))?;

        rows.into_iter().map(|row| self.row_to_alert(row)).collect()
    }

    /// Number of unresolved alerts.
    pub async fn count_unresolved_alerts(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM system_alerts WHERE resolved = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CityError::database("count_unresolved_alerts", e))
    }

    /// Mark an alert resolved. Resolving twice keeps the first resolution time.
    #[instrument(skip(self))]
    pub async fn resolve_alert(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE system_alerts
            SET resolved = 1, resolved_at = COALESCE(resolved_at, ?)
            WHERE id = ?
            "#,
        )
        .bind(now_ms())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("resolve_alert", e))?;

        if result.rows_affected() == 0 {
            return Err(CityError::AlertNotFound { id });
        }

        info!(id, "Alert resolved");
        Ok(())
    }

    fn row_to_alert(&self, row: sqlx::sqlite::SqliteRow) -> Result<Alert> {
        let corrupt = |e: CityError| CityError::DatabaseError(format!("Corrupt alert row: {}", e));

        Ok(Alert {
            id: row.get("id"),
            kind: row.get::<String, _>("kind").parse().map_err(corrupt)?,
            title: row.get("title"),
            message: row.get("message"),
            module: parse_scope(&row.get::<String, _>("module")).map_err(corrupt)?,
            severity: row.get::<String, _>("severity").parse().map_err(corrupt)?,
            resolved: row.get("resolved"),
            created_at_ms: row.get("created_at"),
            resolved_at_ms: row.get("resolved_at"),
        })
    }

    // ========================
    // Activity Operations
    // ========================

    /// Append an entry to the activity feed.
    #[instrument(skip(self, activity), fields(action = %activity.action))]
    pub async fn insert_activity(&self, activity: &NewActivity) -> Result<Activity> {
        let metadata_json = serde_json::to_string(&activity.metadata).map_err(|e| {
            CityError::DatabaseError(format!("Failed to serialize metadata: {}", e))
        })?;
        let created_at_ms = now_ms();

        let result = sqlx::query(
            r#"
            INSERT INTO system_activity (action, module, description, metadata, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&activity.action)
        .bind(scope_str(activity.module))
        .bind(&activity.description)
        .bind(metadata_json)
        .bind(created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| CityError::database("insert_activity", e))?;

        Ok(Activity {
            id: result.last_insert_rowid(),
            action: activity.action.clone(),
            module: activity.module,
            description: activity.description.clone(),
            metadata: activity.metadata.clone(),
            created_at_ms,
        })
    }

    /// Most recent activity first.
    #[instrument(skip(self))]
    pub async fn list_activity(&self, limit: i64) -> Result<Vec<Activity>> {
        let rows = sqlx::query(
            "SELECT * FROM system_activity ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CityError::database("list_activity", e))?;

        rows.into_iter()
            .map(|row| -> Result<Activity> {
                let module = parse_scope(&row.get::<String, _>("module")).map_err(|e| {
                    CityError::DatabaseError(format!("Corrupt activity row: {}", e))
                })?;
                let metadata_json: String = row.get("metadata");
                let metadata = serde_json::from_str(&metadata_json).map_err(|e| {
                    CityError::DatabaseError(format!("Failed to deserialize metadata: {}", e))
                })?;

                Ok(Activity {
                    id: row.get("id"),
                    action: row.get("action"),
                    module,
                    description: row.get("description"),
                    metadata,
                    created_at_ms: row.get("created_at"),
                })
            })
            .collect()
    }

    // ========================
    // Dashboard
    // ========================

    /// Headline figures for the dashboard.
    #[instrument(skip(self))]
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        let total_population: Option<i64> = sqlx::query_scalar(
            "SELECT total_population FROM population_data ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CityError::database("dashboard_metrics", e))?;

        let energy_consumption: Option<f64> = sqlx::query_scalar(
            "SELECT total_consumption FROM energy_data ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CityError::database("dashboard_metrics", e))?;

        let traffic_flow: Option<f64> =
            sqlx::query_scalar("SELECT AVG(flow_rate) FROM traffic_data WHERE timestamp >= ?")
                .bind(now_ms() - 24 * HOUR_MS)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| CityError::database("dashboard_metrics", e))?;

        let latest_aqi: Option<i64> = sqlx::query_scalar(
            "SELECT air_quality_index FROM environmental_data ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CityError::database("dashboard_metrics", e))?;

        Ok(DashboardMetrics {
            total_population: total_population.unwrap_or(0),
            energy_consumption: energy_consumption.unwrap_or(0.0),
            traffic_flow: traffic_flow.unwrap_or(0.0),
            air_quality: AirQuality::from_aqi(latest_aqi),
            alert_count: self.count_unresolved_alerts().await?,
            prediction_count: self.count_predictions().await?,
        })
    }
}

#[async_trait]
impl ForecastStore for StateManager {
    async fn fetch_window(
        &self,
        key: MetricKey,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawReading>> {
        self.readings_in_range(key, start_ms, end_ms).await
    }

    async fn append_prediction(&self, prediction: &NewPrediction) -> Result<Prediction> {
        self.insert_prediction(prediction).await
    }
}
