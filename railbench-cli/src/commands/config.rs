//! `railbench config`

use anyhow::{Context, Result};
use railbench_config::{ConfigLoader, RailbenchConfig};
use std::path::Path;

pub fn handle_config_validate(config_file: &Path) -> Result<()> {
    ConfigLoader::new()
        .from_file(config_file)
        .with_context(|| format!("Configuration {} is invalid", config_file.display()))?;
    eprintln!("Configuration {} is valid", config_file.display());
    Ok(())
}

pub fn handle_config_generate() -> Result<()> {
    let sample = serde_yaml::to_string(&RailbenchConfig::default())
        .context("Failed to render sample configuration")?;
    print!("{}", sample);
    Ok(())
}
