//! `railbench-worker`

use crate::cli::WorkerCli;
use crate::commands::non_empty;
use anyhow::{Context, Result};
use railbench_config::RailbenchConfig;
use railbench_resilience::spawn_shutdown_listener;
use railbench_worker::{
    alerter_from_config, BenchmarkRunner, Dispatcher, JobQueue, PortalClient, Reporter,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Fold command-line flags and `BENCHWORKER_*` variables into the configuration
pub fn apply_worker_args(config: &mut RailbenchConfig, args: &WorkerCli) -> Result<()> {
    let worker = &mut config.worker;
    if let Some(portal) = non_empty(args.portal_url.as_ref()) {
        worker.portal_url = portal;
    }
    if let Some(payment) = non_empty(args.payment_url.as_ref()) {
        worker.payment_url = payment;
    }
    if let Some(port) = args.target_port {
        worker.target_port = port;
    }
    if let Some(asset_dir) = non_empty(args.assetdir.as_ref()) {
        worker.asset_dir = asset_dir;
    }
    if let Some(path) = non_empty(args.benchmarker.as_ref()) {
        worker.benchmarker_path = path;
    }
    if let Some(limit) = args.retry_limit {
        worker.retry_limit = limit;
    }
    if let Some(interval) = args.retry_interval {
        worker.retry_interval = interval;
    }
    if let Some(limit) = args.message_limit {
        worker.message_limit = limit;
    }
    if args.webhook_url.is_some() {
        worker.webhook_url = non_empty(args.webhook_url.as_ref());
    }

    config.validate_all().context("Invalid worker configuration")
}

/// Poll the portal until a shutdown signal arrives
pub async fn worker_command(mut config: RailbenchConfig, args: &WorkerCli) -> Result<()> {
    apply_worker_args(&mut config, args)?;
    let worker = config.worker;

    let alerter = alerter_from_config(worker.webhook_url.as_deref());
    let queue: Arc<dyn JobQueue> = Arc::new(
        PortalClient::new(&worker.portal_url).context("Failed to create portal client")?,
    );
    let reporter = Reporter::from_config(&worker, Arc::clone(&queue), Arc::clone(&alerter));
    let interval = worker.dequeue_interval;
    let runner = BenchmarkRunner::new(worker, alerter);
    let dispatcher = Dispatcher::new(queue, runner, reporter, interval);

    let shutdown = CancellationToken::new();
    let listener = spawn_shutdown_listener(shutdown.clone());

    let processed = dispatcher.run(shutdown.clone()).await;
    shutdown.cancel();
    let _ = listener.await;

    info!(processed, "Worker exited");
    Ok(())
}
