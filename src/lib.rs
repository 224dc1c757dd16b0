//! Taskpool - bounded worker-pool task runner
//!
//! A fixed pool of workers executes submitted work items concurrently with
//! the submitting context. Each submission returns a [`executor::TaskHandle`]
//! used to await the item's tagged outcome.

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod logging;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use executor::{RunnerConfig, TaskFailure, TaskHandle, TaskOutcome, TaskRunner};
