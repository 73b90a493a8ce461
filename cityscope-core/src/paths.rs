//! Centralized path configuration for cityscope.
//!
//! Daemon and CLI resolve every on-disk location through this module so they
//! always agree on where the database and configuration live.

use std::path::PathBuf;

/// Get the cityscope data directory.
///
/// Resolution order:
/// 1. `CITYSCOPE_DATA_DIR` environment variable
/// 2. `/var/lib/cityscope` if it exists (system install)
/// 3. `~/.cityscope` for user-only installs
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CITYSCOPE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let system_dir = PathBuf::from("/var/lib/cityscope");
    if system_dir.exists() {
        return system_dir;
    }

    dirs::home_dir().map(|h| h.join(".cityscope")).unwrap_or(system_dir)
}

/// Get the configuration directory.
///
/// `CITYSCOPE_CONFIG_DIR` wins, otherwise the platform config dir
/// (`~/.config/cityscope` on Linux), otherwise the data directory.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CITYSCOPE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    dirs::config_dir().map(|c| c.join("cityscope")).unwrap_or_else(data_dir)
}

/// Get the database path.
///
/// `CITYSCOPE_DB_PATH` overrides the default `<data_dir>/cityscope.db`.
pub fn db_path() -> PathBuf {
    if let Ok(path) = std::env::var("CITYSCOPE_DB_PATH") {
        return PathBuf::from(path);
    }
    data_dir().join("cityscope.db")
}
