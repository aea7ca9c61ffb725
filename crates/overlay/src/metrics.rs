//! Overlay metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single overlay backend
#[derive(Debug, Default)]
pub struct OverlayMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Total successful replaces
    replace_count: AtomicU64,
    /// Total successful clears
    clear_count: AtomicU64,
    /// Total backend failures
    failure_count: AtomicU64,
    /// Total updates dropped due to full queue
    dropped_count: AtomicU64,
}

impl OverlayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn replace_count(&self) -> u64 {
        self.replace_count.load(Ordering::Relaxed)
    }

    pub fn inc_replace_count(&self) {
        self.replace_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clear_count(&self) -> u64 {
        self.clear_count.load(Ordering::Relaxed)
    }

    pub fn inc_clear_count(&self) {
        self.clear_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            queue_len: self.queue_len(),
            replace_count: self.replace_count(),
            clear_count: self.clear_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of overlay metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct OverlaySnapshot {
    pub queue_len: usize,
    pub replace_count: u64,
    pub clear_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}
