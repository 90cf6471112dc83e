use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use railbench_cli::cli::{Cli, Commands, ConfigCommands};
use railbench_cli::commands::{config, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Run(args)) => {
            run::run_command(cli.config.as_ref(), cli.log_level.as_ref(), args).await
        }
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => config::handle_config_validate(config_file),
            ConfigCommands::Generate => config::handle_config_generate(),
        },
        None => {
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
