//! Bounded worker-pool task runner
//!
//! Accepts units of work, executes them on a fixed pool of workers and
//! hands each result back through a [`TaskHandle`]. Work failures are
//! surfaced as tagged [`TaskOutcome`] values, never as panics or thrown
//! errors crossing the pool boundary.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

use super::state::{TaskId, TaskTracker};

// ─────────────────────────────────────────────────────────────────
// Runner Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the task runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of pool workers
    pub workers: usize,

    /// Capacity of the bounded submit queue
    pub queue_depth: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            queue_depth: 256,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────

/// A captured failure raised during a work item's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    message: String,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message, preserved verbatim from the work item's error
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Terminal outcome of one submitted work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<R> {
    /// The work item produced a value
    Completed(R),
    /// The work item failed; the message is preserved
    Failed(TaskFailure),
}

impl<R> TaskOutcome<R> {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> std::result::Result<R, TaskFailure> {
        match self {
            TaskOutcome::Completed(value) => Ok(value),
            TaskOutcome::Failed(failure) => Err(failure),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Task Handle
// ─────────────────────────────────────────────────────────────────

/// Reference used to retrieve a submitted work item's outcome
///
/// Retrieval is idempotent: the first resolved outcome is cached, and
/// every later call returns the identical value.
#[derive(Debug)]
pub struct TaskHandle<R> {
    id: TaskId,
    rx: Option<oneshot::Receiver<TaskOutcome<R>>>,
    outcome: Option<TaskOutcome<R>>,
}

impl<R: Clone> TaskHandle<R> {
    /// The submitted item's identifier
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Wait for the work item to finish and return its outcome
    ///
    /// Suspends the calling task until the item reaches a terminal state.
    /// Safe to call any number of times.
    pub async fn outcome(&mut self) -> TaskOutcome<R> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let outcome = match self.rx.take() {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                TaskOutcome::Failed(TaskFailure::new("work item abandoned before completion"))
            }),
            // Unreachable while the cache invariant holds
            None => TaskOutcome::Failed(TaskFailure::new("handle has no pending result")),
        };

        self.outcome = Some(outcome.clone());
        outcome
    }
}

// ─────────────────────────────────────────────────────────────────
// Task Runner
// ─────────────────────────────────────────────────────────────────

/// Type-erased unit of work as carried on the queue
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Terminal records kept in the tracker; older ones are reclaimed
const FINISHED_RECORDS_KEPT: usize = 100;

/// Fixed-size worker pool executing submitted work items
///
/// Must be created inside a tokio runtime; workers are spawned as tasks
/// sharing one bounded queue. Independently submitted items may be
/// interleaved or parallelized in any order.
pub struct TaskRunner {
    config: RunnerConfig,
    queue_tx: Mutex<Option<mpsc::Sender<Job>>>,
    closed: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
    tracker: Arc<TaskTracker>,
}

impl TaskRunner {
    /// Create a runner and spawn its workers
    pub fn new(config: RunnerConfig) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel::<Job>(config.queue_depth);
        let queue_rx = Arc::new(tokio::sync::Mutex::new(queue_rx));
        let tracker = Arc::new(TaskTracker::new());

        let mut workers = Vec::with_capacity(config.workers);
        for worker in 0..config.workers {
            let queue_rx = Arc::clone(&queue_rx);
            workers.push(tokio::spawn(async move {
                debug!(worker, "Worker started");
                loop {
                    // Lock only to receive; released before the job runs
                    let job = { queue_rx.lock().await.recv().await };
                    match job {
                        Some(job) => job(),
                        None => break,
                    }
                }
                debug!(worker, "Worker exiting");
            }));
        }

        info!(
            workers = config.workers,
            queue_depth = config.queue_depth,
            "Task runner started"
        );

        Self {
            config,
            queue_tx: Mutex::new(Some(queue_tx)),
            closed: AtomicBool::new(false),
            workers: Mutex::new(workers),
            tracker,
        }
    }

    /// Submit a work item for execution
    ///
    /// Never blocks: the item is placed on the bounded queue and begins
    /// executing concurrently with the caller. Fails with
    /// [`Error::RunnerClosed`] after [`shutdown`](Self::shutdown) and
    /// [`Error::QueueFull`] when the queue is at capacity.
    pub fn submit<R, F>(&self, work: F) -> Result<TaskHandle<R>>
    where
        F: FnOnce() -> anyhow::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::RunnerClosed);
        }

        let id = TaskId::new();
        let (result_tx, result_rx) = oneshot::channel();
        let tracker = Arc::clone(&self.tracker);
        self.tracker.register(id);

        let job: Job = Box::new(move || {
            tracker.mark_running(id);
            debug!(task_id = %id, "Work item started");

            let outcome = match catch_unwind(AssertUnwindSafe(work)) {
                Ok(Ok(value)) => {
                    tracker.mark_completed(id);
                    let (queue_ms, exec_ms) = tracker.timing_of(id).unwrap_or_default();
                    debug!(
                        task_id = %id,
                        queue_time_ms = queue_ms,
                        execution_time_ms = exec_ms,
                        "Work item completed"
                    );
                    TaskOutcome::Completed(value)
                }
                Ok(Err(e)) => {
                    let message = e.to_string();
                    tracker.mark_failed(id, message.clone());
                    warn!(task_id = %id, error = %message, "Work item failed");
                    TaskOutcome::Failed(TaskFailure::new(message))
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    tracker.mark_failed(id, message.clone());
                    error!(task_id = %id, error = %message, "Work item panicked");
                    TaskOutcome::Failed(TaskFailure::new(message))
                }
            };

            // Keep the record map bounded on long-lived runners
            tracker.cleanup_finished(FINISHED_RECORDS_KEPT);

            // The handle may already be dropped; the outcome is then discarded
            let _ = result_tx.send(outcome);
        });

        let guard = self.queue_tx.lock();
        let Some(sender) = guard.as_ref() else {
            self.tracker.forget(id);
            return Err(Error::RunnerClosed);
        };

        match sender.try_send(job) {
            Ok(()) => {
                debug!(task_id = %id, "Work item queued");
                Ok(TaskHandle {
                    id,
                    rx: Some(result_rx),
                    outcome: None,
                })
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.tracker.forget(id);
                Err(Error::QueueFull {
                    depth: self.config.queue_depth,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.tracker.forget(id);
                Err(Error::RunnerClosed)
            }
        }
    }

    /// Shut the runner down
    ///
    /// Closes the intake so later submits fail with `RunnerClosed`, then
    /// drains in-flight work and joins the workers. Idempotent.
    pub async fn shutdown(&self) {
        let was_closed = self.closed.swap(true, Ordering::AcqRel);
        drop(self.queue_tx.lock().take());

        let workers: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker join failed during shutdown");
            }
        }

        if !was_closed {
            info!(
                completed = self.tracker.total_completed(),
                failed = self.tracker.total_failed(),
                "Task runner shut down"
            );
        }
    }

    /// Whether the runner has been shut down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Count of items waiting for a worker
    pub fn pending_count(&self) -> usize {
        self.tracker.pending_count()
    }

    /// Count of items currently executing
    pub fn running_count(&self) -> usize {
        self.tracker.running_count()
    }

    /// Total items completed since creation
    pub fn completed_count(&self) -> u64 {
        self.tracker.total_completed()
    }

    /// Total items failed since creation
    pub fn failed_count(&self) -> u64 {
        self.tracker.total_failed()
    }

    /// Get the task tracker
    pub fn tracker(&self) -> Arc<TaskTracker> {
        Arc::clone(&self.tracker)
    }
}

/// Extract a readable message from a panic payload
fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "work item panicked".to_string()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
