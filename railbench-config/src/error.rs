//! Errors raised while loading railbench configuration

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An override variable is set but does not parse
    #[error("Environment variable {name}: {reason}")]
    Env { name: String, reason: String },

    /// A loaded value breaks a rule of its domain
    #[error("Invalid {domain} configuration: {message}")]
    Invalid {
        domain: &'static str,
        message: String,
    },
}
