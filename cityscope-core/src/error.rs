//! Error types for cityscope.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cityscope operations.
pub type Result<T> = std::result::Result<T, CityError>;

/// Main error type for cityscope.
#[derive(Error, Debug)]
pub enum CityError {
    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Database migration failed: {reason}")]
    MigrationFailed { reason: String },

    // Input errors
    #[error("Unknown module: {name}")]
    UnknownModule { name: String },

    #[error("Alert not found: {id}")]
    AlertNotFound { id: i64 },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Task errors
    #[error("Forecast task for {module} did not complete: {reason}")]
    TaskFailed { module: String, reason: String },

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CityError {
    /// Create an Internal error from any error type.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(err.to_string())
    }

    /// Wrap a sqlx error, counting it against the given operation.
    pub fn database(operation: &'static str, err: sqlx::Error) -> Self {
        metrics::counter!("cityscope_db_errors_total", "operation" => operation).increment(1);
        Self::DatabaseError(err.to_string())
    }
}
