//! Database migrations.

use crate::error::{CityError, Result};
use sqlx::SqlitePool;
use tracing::{info, instrument};

const SCHEMA_VERSION: i64 = 3;

#[instrument(skip(pool))]
pub async fn run(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| CityError::MigrationFailed { reason: e.to_string() })?;

    let current_version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(|e| CityError::MigrationFailed { reason: e.to_string() })?;

    let current_version = current_version.unwrap_or(0);

    if current_version >= SCHEMA_VERSION {
        info!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    info!("Migrating database from version {} to {}", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        migrate_to_v1(pool).await?;
    }

    if current_version < 2 {
        migrate_to_v2(pool).await?;
    }

    if current_version < 3 {
        migrate_to_v3(pool).await?;
    }

    Ok(())
}

async fn exec(pool: &SqlitePool, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| CityError::MigrationFailed { reason: e.to_string() })?;
    Ok(())
}

async fn set_version(pool: &SqlitePool, version: i64) -> Result<()> {
    exec(pool, "DELETE FROM schema_version").await?;
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await
        .map_err(|e| CityError::MigrationFailed { reason: e.to_string() })?;
    Ok(())
}

/// City metric tables.
#[instrument(skip(pool))]
async fn migrate_to_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration to schema version 1");

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS traffic_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER,
            location TEXT NOT NULL,
            flow_rate REAL NOT NULL,
            congestion_level TEXT NOT NULL,
            average_speed REAL,
            vehicle_count INTEGER,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS energy_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER,
            total_consumption REAL NOT NULL,
            renewable_percentage REAL NOT NULL,
            solar_output REAL,
            wind_output REAL,
            grid_load REAL,
            peak_demand REAL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS environmental_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER,
            air_quality_index INTEGER NOT NULL,
            pm25 REAL,
            pm10 REAL,
            temperature REAL,
            humidity REAL,
            noise_level REAL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS population_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER,
            total_population INTEGER NOT NULL,
            active_users INTEGER,
            growth_rate REAL,
            demographics TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    for table in ["traffic_data", "energy_data", "environmental_data", "population_data"] {
        exec(
            pool,
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_timestamp ON {table}(timestamp)"),
        )
        .await?;
    }

    set_version(pool, 1).await?;
    info!("Migration to schema version 1 complete");
    Ok(())
}

/// Prediction log.
#[instrument(skip(pool))]
async fn migrate_to_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration to schema version 2");

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module TEXT NOT NULL,
            prediction_type TEXT NOT NULL,
            predicted_value REAL NOT NULL,
            confidence REAL NOT NULL,
            time_horizon INTEGER NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    exec(pool, "CREATE INDEX IF NOT EXISTS idx_predictions_created ON predictions(created_at)")
        .await?;
    exec(
        pool,
        "CREATE INDEX IF NOT EXISTS idx_predictions_module_created ON predictions(module, created_at)",
    )
    .await?;

    set_version(pool, 2).await?;
    info!("Migration to schema version 2 complete");
    Ok(())
}

/// System alerts and the activity feed.
#[instrument(skip(pool))]
async fn migrate_to_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration to schema version 3");

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS system_alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            module TEXT NOT NULL,
            severity TEXT NOT NULL,
            resolved INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            resolved_at INTEGER
        )
        "#,
    )
    .await?;

    exec(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS system_activity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action TEXT NOT NULL,
            module TEXT NOT NULL,
            description TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    exec(pool, "CREATE INDEX IF NOT EXISTS idx_alerts_created ON system_alerts(created_at)").await?;
    exec(pool, "CREATE INDEX IF NOT EXISTS idx_alerts_resolved ON system_alerts(resolved)").await?;
    exec(pool, "CREATE INDEX IF NOT EXISTS idx_activity_created ON system_activity(created_at)")
        .await?;

    set_version(pool, 3).await?;
    info!("Migration to schema version 3 complete");
    Ok(())
}
