//! `railbench run`

use crate::cli::RunArgs;
use crate::commands::{init_logging, load_config, non_empty};
use anyhow::{Context, Result};
use railbench_client::{HttpReservationClient, HttpServiceFactory, ServiceFactory};
use railbench_config::{CalendarConfig, RailbenchConfig};
use railbench_core::{BenchResult, PenaltyPolicy};
use railbench_load::Benchmark;
use railbench_worker::{alerter_from_config, Alert};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Fold command-line flags into the loaded configuration
pub fn apply_run_args(config: &mut RailbenchConfig, args: &RunArgs) -> Result<()> {
    let benchmark = &mut config.benchmark;
    if let Some(target) = non_empty(args.target.as_ref()) {
        benchmark.target_url = target;
    }
    if let Some(payment) = non_empty(args.payment.as_ref()) {
        benchmark.payment_url = payment;
    }
    if let Some(asset_dir) = non_empty(args.assetdir.as_ref()) {
        benchmark.asset_dir = asset_dir;
    }
    if args.webhookurl.is_some() {
        benchmark.webhook_url = non_empty(args.webhookurl.as_ref());
    }

    config
        .validate_all()
        .context("Invalid benchmark configuration")
}

/// Run one benchmark. Setup failures yield an empty failed result rather
/// than an error so the caller always has a line to print.
pub async fn run_benchmark(config: &RailbenchConfig) -> BenchResult {
    let benchmark = &config.benchmark;
    let default_days = benchmark.calendar.default_available_days;

    if !Path::new(&benchmark.asset_dir).is_dir() {
        error!(asset_dir = %benchmark.asset_dir, "Asset directory not found");
        return BenchResult::failed(Vec::new(), default_days, "");
    }

    if let Err(e) = HttpReservationClient::new(
        &benchmark.target_url,
        &benchmark.payment_url,
        &config.http,
        config.http.api_timeout,
    ) {
        error!("Could not create the service client: {}", e.user_message());
        return BenchResult::failed(Vec::new(), default_days, "");
    }

    let factory: Arc<dyn ServiceFactory> = Arc::new(HttpServiceFactory::new(
        benchmark.target_url.clone(),
        benchmark.payment_url.clone(),
        config.http.clone(),
    ));
    let policy = PenaltyPolicy::from(&config.scoring);

    info!(target = %benchmark.target_url, "Starting benchmark");
    Benchmark::new(benchmark.clone(), factory, policy).run().await
}

/// Alert operators about a failed run when a webhook is configured
pub async fn notify_failure(config: &RailbenchConfig, result: &BenchResult) {
    if result.pass {
        return;
    }
    let Some(url) = config.benchmark.webhook_url.as_deref() else {
        return;
    };

    let mut alert = Alert::new(format!(
        "benchmark against {} failed",
        config.benchmark.target_url
    ));
    if !result.messages.is_empty() {
        alert = alert.with_detail(result.messages.join("\n"));
    }
    alerter_from_config(Some(url)).notify(&alert).await;
}

fn print_result(result: &BenchResult) -> Result<()> {
    let line = result
        .to_json_line()
        .context("Failed to encode benchmark result")?;
    println!("{}", line);
    Ok(())
}

// Setup errors still print an empty failed result before exiting non-zero
fn setup_failed(err: anyhow::Error, default_days: u32) -> Result<()> {
    print_result(&BenchResult::failed(Vec::new(), default_days, ""))?;
    Err(err)
}

/// Entry point of `railbench run`: prints exactly one JSON line whichever
/// step fails
pub async fn run_command(
    config_path: Option<&PathBuf>,
    log_level: Option<&String>,
    args: &RunArgs,
) -> Result<()> {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => return setup_failed(e, CalendarConfig::default().default_available_days),
    };
    let default_days = config.benchmark.calendar.default_available_days;

    if let Err(e) = init_logging(&config.logging, log_level) {
        return setup_failed(e, default_days);
    }
    if let Err(e) = apply_run_args(&mut config, args) {
        error!("{:#}", e);
        return setup_failed(e, default_days);
    }

    let result = run_benchmark(&config).await;
    info!(pass = result.pass, score = result.score, "Benchmark finished");

    notify_failure(&config, &result).await;
    print_result(&result)
}
