//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load and consistency benchmark for train reservation services", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Benchmark a reservation service and print the result as one JSON line
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Base URL of the service under test
    #[arg(long, value_name = "URL", env = "BENCH_TARGET_URL")]
    pub target: Option<String>,

    /// Base URL of the payment service
    #[arg(long, value_name = "URL", env = "BENCH_PAYMENT_URL")]
    pub payment: Option<String>,

    /// Directory holding static test assets
    #[arg(long, value_name = "PATH", env = "BENCH_ASSETDIR")]
    pub assetdir: Option<String>,

    /// Operator alert webhook
    #[arg(long, value_name = "URL", env = "BENCH_SLACK_WEBHOOK_URL")]
    pub webhookurl: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Print a sample configuration with every default
    Generate,
}

/// Arguments of the job worker
#[derive(Parser, Debug)]
#[command(author, version, about = "Runs queued benchmark jobs and reports their results", long_about = None)]
pub struct WorkerCli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Portal holding the job queue
    #[arg(long, value_name = "URL", env = "BENCHWORKER_PORTAL_URL")]
    pub portal_url: Option<String>,

    /// Payment service handed to the benchmarker
    #[arg(long, value_name = "URL", env = "BENCHWORKER_PAYMENT_URL")]
    pub payment_url: Option<String>,

    /// Port of the teams' servers
    #[arg(long, value_name = "PORT", env = "BENCHWORKER_TARGET_PORT")]
    pub target_port: Option<u16>,

    /// Asset directory handed to the benchmarker
    #[arg(long, value_name = "PATH", env = "BENCHWORKER_ASSETDIR")]
    pub assetdir: Option<String>,

    /// Benchmarker executable
    #[arg(long, value_name = "PATH", env = "BENCHWORKER_BENCHMARKER_BINPATH")]
    pub benchmarker: Option<String>,

    /// Report submission attempts
    #[arg(long, value_name = "N", env = "BENCHWORKER_RETRY_LIMIT")]
    pub retry_limit: Option<u32>,

    /// Seconds between report attempts
    #[arg(long, value_name = "SECONDS", env = "BENCHWORKER_RETRY_INTERVAL", value_parser = parse_seconds)]
    pub retry_interval: Option<Duration>,

    /// Messages kept in a reported reason
    #[arg(long, value_name = "N", env = "BENCHWORKER_MESSAGE_LIMIT")]
    pub message_limit: Option<usize>,

    /// Operator alert webhook
    #[arg(long, value_name = "URL", env = "BENCHWORKER_SLACK_WEBHOOK_URL")]
    pub webhook_url: Option<String>,
}

fn parse_seconds(raw: &str) -> Result<Duration, String> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| format!("invalid number of seconds '{}': {}", raw, e))
}
