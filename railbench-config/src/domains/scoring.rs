//! Penalty and disqualification policy

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};

/// Scoring policy applied to the benchmark phase counters.
///
/// The defaults are tuning values for one competition; every field can be
/// overridden from the config file or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Penalty per application error
    #[serde(default = "default_application_weight")]
    pub application_weight: u64,

    /// Application error count above which a run is disqualified
    #[serde(default = "default_application_failure_threshold")]
    pub application_failure_threshold: u64,

    /// Timeout and temporary errors tolerated without penalty
    #[serde(default = "default_trivial_threshold")]
    pub trivial_threshold: u64,

    /// Penalty per step once the trivial threshold is exceeded
    #[serde(default = "default_trivial_weight")]
    pub trivial_weight: u64,

    /// Trivial errors per additional penalty step
    #[serde(default = "default_trivial_per_count")]
    pub trivial_per_count: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            application_weight: default_application_weight(),
            application_failure_threshold: default_application_failure_threshold(),
            trivial_threshold: default_trivial_threshold(),
            trivial_weight: default_trivial_weight(),
            trivial_per_count: default_trivial_per_count(),
        }
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.application_failure_threshold,
            "application_failure_threshold",
            self.domain_name(),
        )?;

        // the step divisor must never be zero
        validate_positive(
            self.trivial_per_count,
            "trivial_per_count",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring"
    }
}

fn default_application_weight() -> u64 {
    10
}

fn default_application_failure_threshold() -> u64 {
    1000
}

fn default_trivial_threshold() -> u64 {
    200
}

fn default_trivial_weight() -> u64 {
    500
}

fn default_trivial_per_count() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_defaults_are_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_step_divisor_rejected() {
        let config = ScoringConfig {
            trivial_per_count: 0,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
