//! `cityscope export` command

use super::open_state;
use anyhow::{Context, Result};
use cityscope_core::types::now_ms;
use cityscope_core::Module;
use std::path::PathBuf;

/// Print every reading of `module` between two Unix millisecond timestamps as JSON
pub async fn export(
    db: Option<PathBuf>,
    module: Module,
    start_ms: i64,
    end_ms: Option<i64>,
) -> Result<()> {
    let state = open_state(db).await?;
    let end_ms = end_ms.unwrap_or_else(now_ms);

    let export = state
        .export_readings(module, start_ms, end_ms)
        .await
        .with_context(|| format!("Failed to export {} readings", module))?;

    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
