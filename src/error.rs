//! Error types for taskpool
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! Note: a WorkItem failing during execution is *not* represented here.
//! Those failures travel as [`crate::executor::TaskOutcome::Failed`] values
//! returned from the handle, so the runner itself stays usable after one
//! item fails.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for taskpool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,

    // Runner errors (5xx)
    RunnerClosed = 500,
    QueueFull = 501,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            500..=599 => 50, // Runner errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for taskpool
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Submit attempted after the runner was shut down
    #[error("Runner is closed: no new work may be submitted")]
    RunnerClosed,

    /// The bounded submit queue is at capacity
    #[error("Task queue is full (depth {depth})")]
    QueueFull { depth: usize },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::WriteZero => ErrorCode::IoWrite,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::RunnerClosed => ErrorCode::RunnerClosed,
            Error::QueueFull { .. } => ErrorCode::QueueFull,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => {
                Some("Run 'taskpool config init' to create a default configuration file.")
            }
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'taskpool config validate' to see details.",
            ),
            Error::ConfigValidation { .. } => {
                Some("Review the configuration file and fix the invalid values.")
            }
            Error::RunnerClosed => {
                Some("The runner was shut down. Create a new runner to submit more work.")
            }
            Error::QueueFull { .. } => {
                Some("Raise 'queue_depth' in the [runner] config section, or submit more slowly.")
            }
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", code.as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }
}
