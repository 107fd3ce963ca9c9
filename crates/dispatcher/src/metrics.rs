//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for the worker pool
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Jobs waiting for a worker
    queue_len: AtomicUsize,
    /// Jobs accepted into the queue
    submitted_count: AtomicU64,
    /// Reactions that returned Ok
    completed_count: AtomicU64,
    /// Reactions that returned an error
    failure_count: AtomicU64,
    /// Reactions that panicked
    panic_count: AtomicU64,
    /// Dispatches with no module or no entry point
    unresolved_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn submitted_count(&self) -> u64 {
        self.submitted_count.load(Ordering::Relaxed)
    }

    pub fn inc_submitted_count(&self) {
        self.submitted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count.load(Ordering::Relaxed)
    }

    pub fn inc_completed_count(&self) {
        self.completed_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn panic_count(&self) -> u64 {
        self.panic_count.load(Ordering::Relaxed)
    }

    pub fn inc_panic_count(&self) {
        self.panic_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unresolved_count(&self) -> u64 {
        self.unresolved_count.load(Ordering::Relaxed)
    }

    pub fn inc_unresolved_count(&self) {
        self.unresolved_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Jobs that finished one way or another
    pub fn finished_count(&self) -> u64 {
        self.completed_count() + self.failure_count() + self.panic_count()
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            submitted_count: self.submitted_count(),
            completed_count: self.completed_count(),
            failure_count: self.failure_count(),
            panic_count: self.panic_count(),
            unresolved_count: self.unresolved_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub submitted_count: u64,
    pub completed_count: u64,
    pub failure_count: u64,
    pub panic_count: u64,
    pub unresolved_count: u64,
}
