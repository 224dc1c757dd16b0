//! CLI argument parsing using clap v4

use clap::{Parser, Subcommand};

/// Taskpool - bounded worker-pool task runner
///
/// Runs submitted work items on a fixed pool of workers and reports each
/// outcome back to the caller.
#[derive(Parser, Debug)]
#[command(name = "taskpool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a batch of sample work items through the pool
    Run {
        /// Path to configuration file
        #[arg(short, long, env = "TASKPOOL_CONFIG")]
        config: Option<String>,

        /// Number of sample work items to submit
        #[arg(short, long, default_value = "10")]
        tasks: usize,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_command_defaults() {
        let cli = Cli::parse_from(["taskpool", "run"]);
        match cli.command {
            Commands::Run { config, tasks } => {
                assert!(config.is_none());
                assert_eq!(tasks, 10);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_with_options() {
        let cli = Cli::parse_from([
            "taskpool",
            "run",
            "--config",
            "/path/to/taskpool.toml",
            "--tasks",
            "100",
        ]);
        match cli.command {
            Commands::Run { config, tasks } => {
                assert_eq!(config, Some("/path/to/taskpool.toml".to_string()));
                assert_eq!(tasks, 100);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["taskpool", "-vv", "run"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["taskpool", "--quiet", "run"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_config_show() {
        let cli = Cli::parse_from(["taskpool", "config", "show"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Show { config },
            } => assert!(config.is_none()),
            _ => panic!("Expected Config Show command"),
        }
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::parse_from(["taskpool", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
