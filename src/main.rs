//! Taskpool binary entry point
//!
//! Parses the CLI, loads configuration, initializes logging and drives the
//! worker pool through the demo batch.

use std::io::Write;

use clap::Parser;
use tracing::info;

use taskpool::cli::{Cli, Commands, ConfigSubcommand};
use taskpool::config::{self, AppConfig};
use taskpool::error::{Error, Result};
use taskpool::{driver, logging};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { subcommand } => {
            // Config commands use minimal logging
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Run { config, tasks } => {
            let config_path = config;
            let app_config = AppConfig::load(config_path.as_deref())?;
            let _log_guards = logging::init_logging(&app_config.logging, cli.verbose, cli.quiet)?;

            info!(version = env!("CARGO_PKG_VERSION"), "Starting taskpool");

            run_batch(app_config, tasks)
        }
    }
}

/// Run the demo batch on a multi-threaded runtime with stdout as the sink
fn run_batch(config: AppConfig, tasks: usize) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let stdout = std::io::stdout();
        let mut sink = stdout.lock();
        let summary = driver::run_batch(&config, tasks, &mut sink).await?;
        writeln!(
            sink,
            "{} completed, {} failed",
            summary.completed, summary.failed
        )?;
        Ok(())
    })
}

/// Handle configuration management subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let app_config = AppConfig::load(config.as_deref())?;
            let toml_str = toml::to_string_pretty(&app_config)?;
            println!("{}", toml_str);
            Ok(())
        }
        ConfigSubcommand::Init { path, force } => config::init_config(path.as_deref(), force),
        ConfigSubcommand::Validate { config } => {
            let app_config = AppConfig::load(config.as_deref())?;
            app_config.validate()?;
            println!("Configuration is valid");
            Ok(())
        }
    }
}
