//! Task execution state tracking
//!
//! Tracks submitted work items through their lifecycle and keeps running
//! totals for completed and failed items.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use parking_lot::RwLock;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────
// Task Identity & State
// ─────────────────────────────────────────────────────────────────

/// Unique identifier for one submitted work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a submitted work item
///
/// Terminal on first completion or first failure: there are no retries,
/// no cancellation and no timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Queued, waiting for a worker
    #[default]
    Pending,
    /// Currently executing on a worker
    Running,
    /// Finished and produced a value
    Completed,
    /// Finished with a captured failure
    Failed,
}

impl TaskState {
    /// Whether the item has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

// ─────────────────────────────────────────────────────────────────
// Task Record
// ─────────────────────────────────────────────────────────────────

/// Per-item bookkeeping held by the tracker
#[derive(Debug)]
pub struct TaskRecord {
    /// Current state
    pub state: TaskState,

    /// When the item was submitted
    pub submitted_at: Instant,

    /// When execution started
    pub started_at: Option<Instant>,

    /// When the item reached a terminal state
    pub finished_at: Option<Instant>,

    /// Failure message, if the item failed
    pub error: Option<String>,
}

impl TaskRecord {
    fn new() -> Self {
        Self {
            state: TaskState::Pending,
            submitted_at: Instant::now(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Queue time in milliseconds
    pub fn queue_time_ms(&self) -> u64 {
        self.started_at
            .map(|s| (s - self.submitted_at).as_millis() as u64)
            .unwrap_or(0)
    }

    /// Execution time in milliseconds
    pub fn execution_time_ms(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).as_millis() as u64,
            (Some(start), None) => start.elapsed().as_millis() as u64,
            _ => 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Task Tracker
// ─────────────────────────────────────────────────────────────────

/// Tracks all submitted work items and aggregate counters
pub struct TaskTracker {
    /// Records by task ID
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,

    /// Completed item count (since creation)
    completed_count: RwLock<u64>,

    /// Failed item count (since creation)
    failed_count: RwLock<u64>,
}

impl TaskTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            completed_count: RwLock::new(0),
            failed_count: RwLock::new(0),
        }
    }

    /// Register a newly submitted item as pending
    pub fn register(&self, id: TaskId) {
        self.tasks.write().insert(id, TaskRecord::new());
    }

    /// Drop an item that never made it onto the queue
    pub fn forget(&self, id: TaskId) {
        self.tasks.write().remove(&id);
    }

    /// Mark an item as running
    pub fn mark_running(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.write();
        if let Some(record) = tasks.get_mut(&id) {
            record.state = TaskState::Running;
            record.started_at = Some(Instant::now());
            true
        } else {
            false
        }
    }

    /// Mark an item as completed
    pub fn mark_completed(&self, id: TaskId) {
        let mut tasks = self.tasks.write();
        if let Some(record) = tasks.get_mut(&id) {
            record.state = TaskState::Completed;
            record.finished_at = Some(Instant::now());
            *self.completed_count.write() += 1;
        }
    }

    /// Mark an item as failed with the captured message
    pub fn mark_failed(&self, id: TaskId, error: String) {
        let mut tasks = self.tasks.write();
        if let Some(record) = tasks.get_mut(&id) {
            record.state = TaskState::Failed;
            record.finished_at = Some(Instant::now());
            record.error = Some(error);
            *self.failed_count.write() += 1;
        }
    }

    /// Get the current state of an item
    pub fn state_of(&self, id: TaskId) -> Option<TaskState> {
        self.tasks.read().get(&id).map(|r| r.state)
    }

    /// Queue and execution times for an item, in milliseconds
    pub fn timing_of(&self, id: TaskId) -> Option<(u64, u64)> {
        self.tasks
            .read()
            .get(&id)
            .map(|r| (r.queue_time_ms(), r.execution_time_ms()))
    }

    /// Count of items waiting for a worker
    pub fn pending_count(&self) -> usize {
        self.tasks
            .read()
            .values()
            .filter(|r| r.state == TaskState::Pending)
            .count()
    }

    /// Count of items currently executing
    pub fn running_count(&self) -> usize {
        self.tasks
            .read()
            .values()
            .filter(|r| r.state == TaskState::Running)
            .count()
    }

    /// Total completed since creation
    pub fn total_completed(&self) -> u64 {
        *self.completed_count.read()
    }

    /// Total failed since creation
    pub fn total_failed(&self) -> u64 {
        *self.failed_count.read()
    }

    /// Clean up terminal records, keeping the most recent `keep_count`
    pub fn cleanup_finished(&self, keep_count: usize) {
        let mut tasks = self.tasks.write();

        let mut finished: Vec<_> = tasks
            .iter()
            .filter(|(_, r)| r.state.is_terminal())
            .map(|(id, r)| (*id, r.finished_at))
            .collect();

        finished.sort_by(|a, b| a.1.cmp(&b.1));

        let to_remove = finished.len().saturating_sub(keep_count);
        for (id, _) in finished.into_iter().take(to_remove) {
            tasks.remove(&id);
        }
    }
}

impl Default for TaskTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_lifecycle() {
        let tracker = TaskTracker::new();
        let id = TaskId::new();

        tracker.register(id);
        assert_eq!(tracker.state_of(id), Some(TaskState::Pending));
        assert_eq!(tracker.pending_count(), 1);

        tracker.mark_running(id);
        assert_eq!(tracker.state_of(id), Some(TaskState::Running));
        assert_eq!(tracker.pending_count(), 0);
        assert_eq!(tracker.running_count(), 1);

        tracker.mark_completed(id);
        assert_eq!(tracker.state_of(id), Some(TaskState::Completed));
        assert_eq!(tracker.running_count(), 0);
        assert_eq!(tracker.total_completed(), 1);
    }

    #[test]
    fn test_failed_lifecycle_preserves_message() {
        let tracker = TaskTracker::new();
        let id = TaskId::new();

        tracker.register(id);
        tracker.mark_running(id);
        tracker.mark_failed(id, "boom".to_string());

        assert_eq!(tracker.state_of(id), Some(TaskState::Failed));
        assert_eq!(tracker.total_failed(), 1);

        let tasks = tracker.tasks.read();
        let record = tasks.get(&id).unwrap();
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_forget_removes_record() {
        let tracker = TaskTracker::new();
        let id = TaskId::new();

        tracker.register(id);
        tracker.forget(id);
        assert_eq!(tracker.state_of(id), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn test_timing_of_finished_item() {
        let tracker = TaskTracker::new();
        let id = TaskId::new();

        tracker.register(id);
        std::thread::sleep(std::time::Duration::from_millis(2));
        tracker.mark_running(id);
        std::thread::sleep(std::time::Duration::from_millis(5));
        tracker.mark_completed(id);

        let (queue_ms, exec_ms) = tracker.timing_of(id).unwrap();
        assert!(queue_ms >= 1);
        assert!(exec_ms >= 4);

        assert!(tracker.timing_of(TaskId::new()).is_none());
    }

    #[test]
    fn test_cleanup_keeps_recent() {
        let tracker = TaskTracker::new();
        let ids: Vec<_> = (0..5).map(|_| TaskId::new()).collect();

        for &id in &ids {
            tracker.register(id);
            tracker.mark_running(id);
            tracker.mark_completed(id);
        }

        tracker.cleanup_finished(2);
        let remaining = tracker.tasks.read().len();
        assert_eq!(remaining, 2);
    }

    #[test]
    fn test_counts_are_cumulative() {
        let tracker = TaskTracker::new();

        for _ in 0..3 {
            let id = TaskId::new();
            tracker.register(id);
            tracker.mark_running(id);
            tracker.mark_completed(id);
        }
        let id = TaskId::new();
        tracker.register(id);
        tracker.mark_running(id);
        tracker.mark_failed(id, "nope".to_string());

        assert_eq!(tracker.total_completed(), 3);
        assert_eq!(tracker.total_failed(), 1);
    }
}
