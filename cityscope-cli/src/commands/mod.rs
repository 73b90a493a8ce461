//! CLI command implementations

use anyhow::{Context, Result};
use cityscope_core::{Config, StateManager};
use std::path::PathBuf;

pub mod alerts;
pub mod dashboard;
pub mod export;
pub mod generate;
pub mod predictions;
pub mod seed;

pub use alerts::{activity, alerts, resolve};
pub use dashboard::dashboard;
pub use export::export;
pub use generate::generate;
pub use predictions::{latest, predictions};
pub use seed::seed;

/// Open the database named by `--db`, or the configured one.
async fn open_state(db: Option<PathBuf>) -> Result<StateManager> {
    let path = match db {
        Some(path) => path,
        None => PathBuf::from(Config::load().context("Failed to load configuration")?.db_path),
    };

    StateManager::new(&path)
        .await
        .with_context(|| format!("Failed to open state database at {}", path.display()))
}

/// Formats an age in milliseconds relative to now.
pub(crate) fn format_age(age_ms: i64) -> String {
    let secs = (age_ms / 1000).max(0);
    if secs < 60 {
        format!("{} seconds ago", secs)
    } else if secs < 3600 {
        format!("{} minutes ago", secs / 60)
    } else if secs < 86400 {
        format!("{} hours ago", secs / 3600)
    } else {
        format!("{} days ago", secs / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(-5), "0 seconds ago");
        assert_eq!(format_age(42_000), "42 seconds ago");
        assert_eq!(format_age(5 * 60_000), "5 minutes ago");
        assert_eq!(format_age(3 * 3_600_000), "3 hours ago");
        assert_eq!(format_age(2 * 86_400_000), "2 days ago");
    }
}
