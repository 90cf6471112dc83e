//! HTTP client configuration for the service under test

use crate::error::ConfigResult;
use crate::validation::{validate_duration, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout during the load phase
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_api_timeout"
    )]
    pub api_timeout: Duration,

    /// Timeout of the initialize call, which may rebuild the service's data
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_initialize_timeout"
    )]
    pub initialize_timeout: Duration,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to verify TLS certificates of the target
    #[serde(default)]
    pub verify_ssl: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_timeout: default_api_timeout(),
            initialize_timeout: default_initialize_timeout(),
            user_agent: default_user_agent(),
            verify_ssl: false,
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_duration(self.api_timeout, "api_timeout", self.domain_name())?;
        validate_duration(self.initialize_timeout, "initialize_timeout", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

// Default value functions
fn default_api_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_initialize_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_user_agent() -> String {
    "railbench/0.1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.api_timeout, Duration::from_secs(20));
        assert_eq!(config.user_agent, "railbench/0.1");
        assert!(!config.verify_ssl);
    }

    #[test]
    fn test_http_config_validation() {
        let mut config = HttpConfig::default();
        assert!(config.validate().is_ok());

        config.api_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config = HttpConfig::default();
        config.user_agent = String::new();
        assert!(config.validate().is_err());
    }
}
