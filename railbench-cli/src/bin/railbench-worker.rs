use anyhow::Result;
use clap::Parser;
use railbench_cli::cli::WorkerCli;
use railbench_cli::commands::{self, worker};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WorkerCli::parse();

    let config = commands::load_config(cli.config.as_ref())?;
    commands::init_logging(&config.logging, cli.log_level.as_ref())?;
    tracing::info!("railbench worker starting");

    worker::worker_command(config, &cli).await
}
