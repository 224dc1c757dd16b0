//! Demo driver
//!
//! Submits a batch of sample work items through the pool and writes every
//! outcome to an injected sink. The sink is always passed in by the caller;
//! nothing here writes to a process-global stream.

use std::io::Write;

use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::executor::{TaskOutcome, TaskRunner};

/// Aggregate result of one driver batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items that produced a value
    pub completed: usize,
    /// Items that failed
    pub failed: usize,
}

/// Run a batch of sample work items and write outcomes to `sink`
///
/// Submits `task_count` index-returning items plus one deliberately failing
/// item, awaits every handle, then shuts the runner down.
pub async fn run_batch<W: Write>(
    config: &AppConfig,
    task_count: usize,
    sink: &mut W,
) -> Result<BatchSummary> {
    let runner = TaskRunner::new(config.runner.to_runner_config());

    let mut handles = Vec::with_capacity(task_count);
    for index in 0..task_count {
        handles.push(runner.submit(move || Ok(format!("Task {} result", index)))?);
    }

    // One failing item demonstrates failure reporting
    let mut failing = runner.submit::<String, _>(|| Err(anyhow::anyhow!("sample failure")))?;

    // Collect every outcome and release the pool before touching the
    // sink, so a write error cannot leave workers running
    let mut outcomes = Vec::with_capacity(task_count + 1);
    for handle in handles.iter_mut() {
        outcomes.push((handle.id(), handle.outcome().await));
    }
    outcomes.push((failing.id(), failing.outcome().await));

    runner.shutdown().await;

    let mut summary = BatchSummary {
        completed: 0,
        failed: 0,
    };

    for (id, outcome) in outcomes {
        match outcome {
            TaskOutcome::Completed(value) => {
                summary.completed += 1;
                writeln!(sink, "{}", value)?;
            }
            TaskOutcome::Failed(failure) => {
                summary.failed += 1;
                writeln!(sink, "task {} failed: {}", id, failure)?;
            }
        }
    }

    info!(
        completed = summary.completed,
        failed = summary.failed,
        "Batch finished"
    );

    Ok(summary)
}
