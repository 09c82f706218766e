//! Implementation of the `lockfile status` command.
//!
//! Reports the state of a lock, its holder and the age of the claim, and
//! flags claims older than the configured stale threshold.

use crate::cli::StatusArgs;
use lockfile::config::Config;
use lockfile::error::{LockfileError, Result};
use lockfile::locks::{FileLock, LockInfo};
use serde_json::json;

/// Execute the `lockfile status` command.
pub fn cmd_status(args: StatusArgs, config: &Config) -> Result<()> {
    let lock = FileLock::from_config(&args.path, config)?;
    let info = lock.info();
    let stale = info.is_stale(config.stale_minutes);

    if args.json {
        println!("{}", render_json(&info, stale)?);
    } else {
        println!("{}", render_text(&info, stale));
    }
    Ok(())
}

pub(super) fn render_text(info: &LockInfo, stale: bool) -> String {
    let stale_marker = if stale { " [STALE]" } else { "" };
    format!("{}{}", info, stale_marker)
}

pub(super) fn render_json(info: &LockInfo, stale: bool) -> Result<String> {
    let mut value = serde_json::to_value(info).map_err(|e| {
        LockfileError::UserError(format!("failed to serialize lock info: {}", e))
    })?;
    if let Some(object) = value.as_object_mut() {
        object.insert("stale".to_string(), json!(stale));
    }
    serde_json::to_string_pretty(&value)
        .map_err(|e| LockfileError::UserError(format!("failed to serialize lock info: {}", e)))
}
