//! Show the effective configuration, optionally saving it.

use anyhow::Context;
use vptz_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, init: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if init {
        config
            .save()
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
    }
    println!("# Standard location: {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
