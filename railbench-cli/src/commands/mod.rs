//! Command implementations shared by both binaries

pub mod config;
pub mod run;
pub mod worker;

use anyhow::{Context, Result};
use railbench_config::{ConfigLoader, LoggingConfig, RailbenchConfig};
use std::path::PathBuf;

/// Load configuration from the file (or defaults) with `RAILBENCH_*` overrides
pub fn load_config(config_path: Option<&PathBuf>) -> Result<RailbenchConfig> {
    ConfigLoader::new().load(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })
}

/// Install the stderr subscriber; `--log-level` wins over the config file
pub fn init_logging(config: &LoggingConfig, log_level: Option<&String>) -> Result<()> {
    match log_level {
        Some(level) => railbench_logging::init_simple_tracing(level),
        None => railbench_logging::init_logging_from_config(config),
    }
}

/// Empty strings from flags mean "unset"
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}
