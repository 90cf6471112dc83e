//! Configuration loading and environment variable handling

use crate::domains::RailbenchConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "RAILBENCH".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<RailbenchConfig> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let mut config: RailbenchConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<RailbenchConfig> {
        let mut config = RailbenchConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<RailbenchConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut RailbenchConfig) -> ConfigResult<()> {
        self.apply_benchmark_overrides(&mut config.benchmark)?;
        self.apply_scoring_overrides(&mut config.scoring)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_logging_overrides(&mut config.logging)?;
        self.apply_worker_overrides(&mut config.worker)?;
        Ok(())
    }

    fn apply_benchmark_overrides(
        &self,
        config: &mut crate::domains::benchmark::BenchmarkConfig,
    ) -> ConfigResult<()> {
        if let Ok(target) = self.get_env_var("TARGET_URL") {
            config.target_url = target;
        }

        if let Ok(payment) = self.get_env_var("PAYMENT_URL") {
            config.payment_url = payment;
        }

        if let Ok(asset_dir) = self.get_env_var("ASSET_DIR") {
            config.asset_dir = asset_dir;
        }

        if let Ok(webhook) = self.get_env_var("WEBHOOK_URL") {
            config.webhook_url = Some(webhook);
        }

        if let Some(timeout) = self.parse_seconds("BENCHMARK_TIMEOUT")? {
            config.benchmark_timeout = timeout;
        }

        if let Some(level) = self.parse_env::<u32>("LOAD_LEVEL")? {
            config.load_level = Some(level);
        }

        Ok(())
    }

    fn apply_scoring_overrides(
        &self,
        config: &mut crate::domains::scoring::ScoringConfig,
    ) -> ConfigResult<()> {
        if let Some(threshold) = self.parse_env::<u64>("APPLICATION_FAILURE_THRESHOLD")? {
            config.application_failure_threshold = threshold;
        }

        if let Some(threshold) = self.parse_env::<u64>("TRIVIAL_THRESHOLD")? {
            config.trivial_threshold = threshold;
        }

        Ok(())
    }

    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Some(timeout) = self.parse_seconds("API_TIMEOUT")? {
            config.api_timeout = timeout;
        }

        if let Ok(user_agent) = self.get_env_var("USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Some(verify_ssl) = self.parse_env::<bool>("VERIFY_SSL")? {
            config.verify_ssl = verify_ssl;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|reason| self.env_error("LOG_LEVEL", reason))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|reason| self.env_error("LOG_FORMAT", reason))?;
        }

        Ok(())
    }

    fn apply_worker_overrides(
        &self,
        config: &mut crate::domains::worker::WorkerConfig,
    ) -> ConfigResult<()> {
        if let Ok(portal) = self.get_env_var("PORTAL_URL") {
            config.portal_url = portal;
        }

        if let Ok(path) = self.get_env_var("BENCHMARKER_PATH") {
            config.benchmarker_path = path;
        }

        if let Some(limit) = self.parse_env::<u32>("RETRY_LIMIT")? {
            config.retry_limit = limit;
        }

        if let Some(interval) = self.parse_seconds("RETRY_INTERVAL")? {
            config.retry_interval = interval;
        }

        if let Some(limit) = self.parse_env::<usize>("MESSAGE_LIMIT")? {
            config.message_limit = limit;
        }

        if let Some(timeout) = self.parse_seconds("BENCH_TIMEOUT")? {
            config.bench_timeout = timeout;
        }

        if let Some(port) = self.parse_env::<u16>("TARGET_PORT")? {
            config.target_port = port;
        }

        Ok(())
    }

    fn parse_env<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| self.env_error(name, e)),
            Err(_) => Ok(None),
        }
    }

    fn parse_seconds(&self, name: &str) -> ConfigResult<Option<Duration>> {
        Ok(self.parse_env::<u64>(name)?.map(Duration::from_secs))
    }

    fn env_error(&self, name: &str, reason: impl std::fmt::Display) -> ConfigError {
        ConfigError::Env {
            name: format!("{}_{}", self.prefix, name),
            reason: format!("invalid value: {}", reason),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
