//! Acquisition statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use ingestion::MetricsSnapshot as SourceSnapshot;
use observability::AcquisitionMetricsAggregator;

/// Statistics from an acquisition run
#[derive(Debug, Clone, Default)]
pub struct AcquisitionStats {
    /// Ticks executed
    pub ticks: u64,

    /// Frame pairs received from the source
    pub frames: u64,

    /// Records appended to the sink
    pub records_written: u64,

    /// Ticks on which the source reported exhaustion
    pub exhausted: u64,

    /// Successful rewinds of the source
    pub restarts: u64,

    /// Candidate frames dropped for a bad hex line
    pub malformed_frames: u64,

    /// Distance lines without a following status line
    pub orphan_frames: u64,

    /// Ticks on which the source failed to produce a reading
    pub source_failures: u64,

    /// Ticks on which the sink rejected the records
    pub sink_failures: u64,

    /// Failed writes of the hex trace
    pub trace_errors: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Frame/tick aggregates
    pub frame_metrics: AcquisitionMetricsAggregator,
}

impl AcquisitionStats {
    /// Frame pairs per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fraction of ticks without a frame (failure or exhaustion), in percent
    pub fn idle_rate(&self) -> f64 {
        if self.ticks > 0 {
            (self.ticks - self.frames) as f64 / self.ticks as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Fold in the recorder's view of the sink
    pub fn absorb_sink(&mut self, snapshot: MetricsSnapshot) {
        self.records_written = snapshot.records_written;
        self.sink_failures = snapshot.failure_count;
    }

    /// Fold in the source's ingestion counters
    pub fn absorb_source(&mut self, snapshot: SourceSnapshot) {
        self.malformed_frames = snapshot.malformed_frames;
        self.orphan_frames = snapshot.orphan_frames;
    }

    /// Candidate frames the source dropped
    pub fn skipped_frames(&self) -> u64 {
        self.malformed_frames + self.orphan_frames
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Acquisition Statistics ===\n");

        println!("Overview");
        println!("   |- Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   |- Ticks: {}", self.ticks);
        println!("   |- Frames: {}", self.frames);
        println!("   |- Records written: {}", self.records_written);
        println!("   |- FPS: {:.2}", self.fps());
        println!("   `- Idle ticks: {:.2}%", self.idle_rate());

        println!("\nSource / Sink");
        println!("   |- Exhausted: {} (restarts: {})", self.exhausted, self.restarts);
        println!(
            "   |- Skipped frames: {} (malformed: {}, orphan: {})",
            self.skipped_frames(),
            self.malformed_frames,
            self.orphan_frames
        );
        println!("   |- Source failures: {}", self.source_failures);
        println!("   |- Sink failures: {}", self.sink_failures);
        println!("   `- Trace errors: {}", self.trace_errors);

        println!("\n{}", self.frame_metrics.summary());
    }
}
