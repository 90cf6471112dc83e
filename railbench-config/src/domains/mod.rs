//! Domain-specific configuration modules

pub mod benchmark;
pub mod http;
pub mod logging;
pub mod scoring;
pub mod utils;
pub mod worker;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main railbench configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RailbenchConfig {
    /// Benchmark run configuration (targets, deadlines, calendar)
    #[serde(default)]
    pub benchmark: benchmark::BenchmarkConfig,

    /// Penalty and disqualification policy
    #[serde(default)]
    pub scoring: scoring::ScoringConfig,

    /// HTTP client configuration for the service under test
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Job dispatch worker configuration
    #[serde(default)]
    pub worker: worker::WorkerConfig,
}

impl RailbenchConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.benchmark.validate()?;
        self.scoring.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        self.worker.validate()?;

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = RailbenchConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
