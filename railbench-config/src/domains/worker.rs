//! Job dispatch worker configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_duration, validate_positive, validate_required_string, validate_url, Validatable,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Job dispatch worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Base URL of the portal holding the job queue
    #[serde(default = "default_portal_url")]
    pub portal_url: String,

    /// Payment service URL handed to the benchmarker
    #[serde(default = "default_payment_url")]
    pub payment_url: String,

    /// Port of the team's target servers
    #[serde(default = "default_target_port")]
    pub target_port: u16,

    /// Asset directory handed to the benchmarker
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// Path of the benchmarker executable
    #[serde(default = "default_benchmarker_path")]
    pub benchmarker_path: String,

    /// Report retries after the first failed submission
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Fixed delay between report attempts
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_retry_interval"
    )]
    pub retry_interval: Duration,

    /// Messages kept in the reported reason
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    /// Queue polling interval
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_dequeue_interval"
    )]
    pub dequeue_interval: Duration,

    /// Hard deadline of one benchmarker subprocess
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_bench_timeout"
    )]
    pub bench_timeout: Duration,

    /// Operator alert webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            portal_url: default_portal_url(),
            payment_url: default_payment_url(),
            target_port: default_target_port(),
            asset_dir: default_asset_dir(),
            benchmarker_path: default_benchmarker_path(),
            retry_limit: default_retry_limit(),
            retry_interval: default_retry_interval(),
            message_limit: default_message_limit(),
            dequeue_interval: default_dequeue_interval(),
            bench_timeout: default_bench_timeout(),
            webhook_url: None,
        }
    }
}

impl Validatable for WorkerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.portal_url, "portal_url", self.domain_name())?;
        validate_url(&self.payment_url, "payment_url", self.domain_name())?;
        validate_required_string(&self.benchmarker_path, "benchmarker_path", self.domain_name())?;
        validate_required_string(&self.asset_dir, "asset_dir", self.domain_name())?;
        validate_positive(self.target_port, "target_port", self.domain_name())?;
        validate_positive(self.retry_limit, "retry_limit", self.domain_name())?;
        validate_positive(self.message_limit, "message_limit", self.domain_name())?;
        validate_duration(self.retry_interval, "retry_interval", self.domain_name())?;
        validate_duration(self.dequeue_interval, "dequeue_interval", self.domain_name())?;
        validate_duration(self.bench_timeout, "bench_timeout", self.domain_name())?;

        if let Some(ref webhook) = self.webhook_url {
            validate_url(webhook, "webhook_url", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "worker"
    }
}

// Default value functions
fn default_portal_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_payment_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_target_port() -> u16 {
    443
}

fn default_asset_dir() -> String {
    "/opt/railbench/assets".to_string()
}

fn default_benchmarker_path() -> String {
    "/opt/railbench/bin/railbench".to_string()
}

fn default_retry_limit() -> u32 {
    10
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_message_limit() -> usize {
    10
}

fn default_dequeue_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_bench_timeout() -> Duration {
    Duration::from_secs(180)
}
