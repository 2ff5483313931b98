//! Recorder metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one recorder and its sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Frames that produced at least one record and were written
    frames_persisted: AtomicU64,
    /// Frames with no valid zone (nothing written)
    empty_frames: AtomicU64,
    /// Total records appended
    records_written: AtomicU64,
    /// Total failed appends
    failure_count: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get persisted frame count
    pub fn frames_persisted(&self) -> u64 {
        self.frames_persisted.load(Ordering::Relaxed)
    }

    /// Get empty frame count
    pub fn empty_frames(&self) -> u64 {
        self.empty_frames.load(Ordering::Relaxed)
    }

    /// Get total record count
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Record a successful append of `records` records
    pub fn record_persisted(&self, records: usize) {
        self.frames_persisted.fetch_add(1, Ordering::Relaxed);
        self.records_written
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    /// Record a frame without valid zones
    pub fn inc_empty_frames(&self) {
        self.empty_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_persisted: self.frames_persisted(),
            empty_frames: self.empty_frames(),
            records_written: self.records_written(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_persisted: u64,
    pub empty_frames: u64,
    pub records_written: u64,
    pub failure_count: u64,
}
