//! Benchmark run configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_duration, validate_positive, validate_required_string, validate_url, Validatable,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Benchmark run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Base URL of the reservation service under test
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Base URL of the payment service
    #[serde(default = "default_payment_url")]
    pub payment_url: String,

    /// Directory holding static test assets
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// Operator alert webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Wall-clock window of the load phase
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_benchmark_timeout"
    )]
    pub benchmark_timeout: Duration,

    /// Pause between the load phase and the final check
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_final_check_delay"
    )]
    pub final_check_delay: Duration,

    /// Fixed load level. When unset the level is the month of the last
    /// reservable date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_level: Option<u32>,

    /// Reservation calendar
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Reservation calendar and the seasonal windows that gate scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// First reservable date
    #[serde(default = "default_reservation_start")]
    pub reservation_start_date: NaiveDate,

    /// Reservable days assumed until the service reports its own value
    #[serde(default = "default_available_days")]
    pub default_available_days: u32,

    #[serde(default = "default_golden_week_start")]
    pub golden_week_start: NaiveDate,

    #[serde(default = "default_golden_week_end")]
    pub golden_week_end: NaiveDate,

    #[serde(default = "default_olympic_start")]
    pub olympic_start: NaiveDate,

    #[serde(default = "default_olympic_end")]
    pub olympic_end: NaiveDate,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            payment_url: default_payment_url(),
            asset_dir: default_asset_dir(),
            webhook_url: None,
            benchmark_timeout: default_benchmark_timeout(),
            final_check_delay: default_final_check_delay(),
            load_level: None,
            calendar: CalendarConfig::default(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            reservation_start_date: default_reservation_start(),
            default_available_days: default_available_days(),
            golden_week_start: default_golden_week_start(),
            golden_week_end: default_golden_week_end(),
            olympic_start: default_olympic_start(),
            olympic_end: default_olympic_end(),
        }
    }
}

impl Validatable for BenchmarkConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.target_url, "target_url", self.domain_name())?;
        validate_url(&self.payment_url, "payment_url", self.domain_name())?;
        validate_required_string(&self.asset_dir, "asset_dir", self.domain_name())?;

        if let Some(ref webhook) = self.webhook_url {
            validate_url(webhook, "webhook_url", self.domain_name())?;
        }

        validate_duration(self.benchmark_timeout, "benchmark_timeout", self.domain_name())?;

        if let Some(level) = self.load_level {
            validate_positive(level, "load_level", self.domain_name())?;
        }

        self.calendar.validate()
    }

    fn domain_name(&self) -> &'static str {
        "benchmark"
    }
}

impl Validatable for CalendarConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.default_available_days,
            "default_available_days",
            self.domain_name(),
        )?;

        if self.golden_week_end < self.golden_week_start {
            return Err(self.validation_error("golden_week_end precedes golden_week_start"));
        }

        if self.olympic_end < self.olympic_start {
            return Err(self.validation_error("olympic_end precedes olympic_start"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "benchmark.calendar"
    }
}

// Default value functions
fn default_target_url() -> String {
    "http://localhost".to_string()
}

fn default_payment_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_asset_dir() -> String {
    "assets/testdata".to_string()
}

fn default_benchmark_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_final_check_delay() -> Duration {
    Duration::from_secs(5)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn default_reservation_start() -> NaiveDate {
    date(2020, 1, 1)
}

fn default_available_days() -> u32 {
    10
}

fn default_golden_week_start() -> NaiveDate {
    date(2020, 4, 29)
}

fn default_golden_week_end() -> NaiveDate {
    date(2020, 5, 6)
}

fn default_olympic_start() -> NaiveDate {
    date(2020, 7, 24)
}

fn default_olympic_end() -> NaiveDate {
    date(2020, 8, 9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_config_defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.target_url, "http://localhost");
        assert_eq!(config.benchmark_timeout, Duration::from_secs(60));
        assert!(config.load_level.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_benchmark_config_validation() {
        let mut config = BenchmarkConfig::default();
        config.benchmark_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config = BenchmarkConfig::default();
        config.load_level = Some(0);
        assert!(config.validate().is_err());

        config = BenchmarkConfig::default();
        config.webhook_url = Some("hooks".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_calendar_window_order() {
        let mut calendar = CalendarConfig::default();
        calendar.olympic_end = date(2020, 7, 1);
        assert!(calendar.validate().is_err());
    }
}
