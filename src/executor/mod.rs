//! Task executor module
//!
//! Handles the work item lifecycle:
//! - Accepting submitted work onto a bounded queue
//! - Running it on a fixed pool of workers
//! - Tracking execution state
//! - Handing outcomes back through handles

mod runner;
mod state;

pub use runner::*;
pub use state::*;
