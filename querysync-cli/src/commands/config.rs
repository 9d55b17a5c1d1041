//! Config command implementation

use anyhow::{Context, Result};
use querysync_core::QuerySyncConfig;
use std::path::Path;

/// Print one configuration value by dotted key
pub fn show_config_value(config_path: &Path, key: &str) -> Result<()> {
    let config = QuerySyncConfig::from_file(config_path).context("Failed to load configuration")?;
    let value = config
        .get(key)
        .with_context(|| format!("Unknown config key: {}", key))?;
    println!("{}", value);
    Ok(())
}
