//! Configuration system for taskpool
//!
//! Supports multiple configuration sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (TASKPOOL_* prefix)
//! 2. Configuration file (TOML)
//! 3. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::executor::RunnerConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Worker pool settings
    pub runner: RunnerSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Number of pool workers (0 = one per CPU)
    pub workers: usize,

    /// Capacity of the bounded submit queue
    pub queue_depth: usize,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (unset = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runner: RunnerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            workers: 0, // Auto-detect
            queue_depth: 256,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl RunnerSettings {
    /// Resolve into the executor's runtime configuration
    pub fn to_runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            workers: if self.workers == 0 {
                num_cpus::get().max(1)
            } else {
                self.workers
            },
            queue_depth: self.queue_depth,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("invalid TOML in {}", path.display()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::ConfigNotFound { path });
            }
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("taskpool.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("taskpool").join("taskpool.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".taskpool").join("taskpool.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TASKPOOL_WORKERS") {
            if let Ok(n) = val.parse() {
                self.runner.workers = n;
            }
        }
        if let Ok(val) = std::env::var("TASKPOOL_QUEUE_DEPTH") {
            if let Ok(n) = val.parse() {
                self.runner.queue_depth = n;
            }
        }
        if let Ok(val) = std::env::var("TASKPOOL_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("TASKPOOL_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("TASKPOOL_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and environment variables in paths
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.runner.queue_depth == 0 {
            return Err(Error::ConfigValidation {
                message: "queue_depth must be at least 1".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".taskpool")
                .join("taskpool.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(&config_path, generate_default_config())
        .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Taskpool Configuration

[runner]
# Number of pool workers (0 = one per CPU)
workers = 0

# Capacity of the bounded submit queue
queue_depth = 256

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.taskpool/logs/taskpool.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
