//! Source metrics

use std::sync::atomic::{AtomicU64, Ordering};

pub use contracts::MalformedPolicy;

/// Ingestion metrics
///
/// Shared between a source and whoever reports on it (loop statistics,
/// `inspect` summary), hence the atomics.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Complete frame pairs produced
    pub frames_decoded: AtomicU64,

    /// Candidate frames dropped for bad length or digits
    pub malformed_frames: AtomicU64,

    /// HEX DATA lines not followed by a TARGET STATUS line
    pub orphan_frames: AtomicU64,

    /// Rewinds to the start of the input
    pub rewinds: AtomicU64,

    /// Failed reads (driver failure or IO error)
    pub read_failures: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record frame pair produced
    pub fn record_frame(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record malformed candidate frame
    pub fn record_malformed(&self) {
        self.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Record distance line without status line
    pub fn record_orphan(&self) {
        self.orphan_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Record rewind
    pub fn record_rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::Relaxed);
    }

    /// Record failed read
    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            orphan_frames: self.orphan_frames.load(Ordering::Relaxed),
            rewinds: self.rewinds.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Complete frame pairs produced
    pub frames_decoded: u64,

    /// Candidate frames dropped for bad length or digits
    pub malformed_frames: u64,

    /// HEX DATA lines not followed by a TARGET STATUS line
    pub orphan_frames: u64,

    /// Rewinds to the start of the input
    pub rewinds: u64,

    /// Failed reads
    pub read_failures: u64,
}

impl MetricsSnapshot {
    /// Candidate frames that never became a frame pair
    pub fn skipped_frames(&self) -> u64 {
        self.malformed_frames + self.orphan_frames
    }
}
