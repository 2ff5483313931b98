//! Acquisition session - one tick of the pipeline
//!
//! Owns the frame source, the recorder and the hex trace. Exclusive
//! ownership serializes every poll and append, so no locking is needed.

use std::sync::Arc;
use std::time::Instant;

use contracts::{ContractError, FramePair, FrameSource, RecordSink, SourcePoll};
use dispatcher::{HexTrace, Recorder};
use ingestion::IngestionMetrics;
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SessionClock};
use crate::stats::AcquisitionStats;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame pair was acquired and its valid zones appended
    Persisted {
        /// Timestamp stamped on the records
        timestamp_ms: u64,
        /// Records appended (0 when no zone was valid)
        records: usize,
    },

    /// A frame pair was acquired but the sink rejected it; its data is lost
    SinkFailed {
        /// Timestamp of the lost frame
        timestamp_ms: u64,
    },

    /// The replay input ran out
    Exhausted {
        /// Whether the source was rewound
        restarted: bool,
    },

    /// The source could not produce a reading this tick
    SourceFailed,
}

/// Source, recorder, trace and clock of one acquisition run
pub struct AcquisitionSession<S, K, C = SessionClock> {
    source: S,
    recorder: Recorder<K>,
    trace: HexTrace,
    clock: C,
    source_metrics: Option<Arc<IngestionMetrics>>,
    stats: AcquisitionStats,
}

impl<S, K> AcquisitionSession<S, K, SessionClock>
where
    S: FrameSource,
    K: RecordSink,
{
    /// Session whose timestamps start at zero now
    pub fn new(source: S, sink: K, trace: HexTrace) -> Self {
        Self::with_clock(source, sink, trace, SessionClock::start())
    }
}

impl<S, K, C> AcquisitionSession<S, K, C>
where
    S: FrameSource,
    K: RecordSink,
    C: Clock,
{
    /// Session with an explicit clock
    pub fn with_clock(source: S, sink: K, trace: HexTrace, clock: C) -> Self {
        Self {
            source,
            recorder: Recorder::new(sink),
            trace,
            clock,
            source_metrics: None,
            stats: AcquisitionStats::default(),
        }
    }

    /// Report the source's skipped-frame counters in [`Self::stats`]
    ///
    /// `metrics` must be the handle of the source owned by this session.
    pub fn with_source_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.source_metrics = Some(metrics);
        self
    }

    /// The frame source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The recorder in front of the sink
    pub fn recorder(&self) -> &Recorder<K> {
        &self.recorder
    }

    /// Statistics so far, with the recorder's counters folded in
    pub fn stats(&self) -> AcquisitionStats {
        let mut stats = self.stats.clone();
        stats.absorb_sink(self.recorder.metrics().snapshot());
        if let Some(metrics) = &self.source_metrics {
            stats.absorb_source(metrics.snapshot());
        }
        stats
    }

    /// Run one poll/trace/persist step
    ///
    /// Driver and sink failures are absorbed (logged and counted). Only a
    /// failed rewind of an exhausted replay is returned as an error.
    #[instrument(name = "acquisition_tick", skip(self), fields(source = %self.source.name()))]
    pub async fn tick(&mut self) -> Result<TickOutcome, ContractError> {
        let started = Instant::now();
        self.stats.ticks += 1;

        let outcome = match self.source.poll_frame() {
            SourcePoll::Frame(frame) => self.handle_frame(&frame).await,
            SourcePoll::Exhausted => self.handle_exhausted()?,
            SourcePoll::Failure(reason) => {
                self.stats.source_failures += 1;
                observability::record_source_failure(self.source.name());
                warn!(source = %self.source.name(), %reason, "No reading this tick");
                TickOutcome::SourceFailed
            }
        };

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.frame_metrics.record_tick(latency_ms);
        observability::record_tick_latency_ms(latency_ms);

        Ok(outcome)
    }

    async fn handle_frame(&mut self, frame: &FramePair) -> TickOutcome {
        let timestamp_ms = self.clock.elapsed_ms();
        self.stats.frames += 1;
        self.stats.frame_metrics.update(frame);
        observability::record_frame_acquired(frame, timestamp_ms);

        if let Err(e) = self.trace.emit(frame) {
            self.stats.trace_errors += 1;
            debug!(error = %e, "Hex trace write failed");
        }

        match self.recorder.persist(frame, timestamp_ms).await {
            Ok(records) => {
                observability::record_persist(self.recorder.sink().name(), true);
                debug!(timestamp_ms, records, "Frame persisted");
                TickOutcome::Persisted {
                    timestamp_ms,
                    records,
                }
            }
            Err(e) => {
                observability::record_persist(self.recorder.sink().name(), false);
                warn!(timestamp_ms, error = %e, "Failed to persist frame, records dropped");
                TickOutcome::SinkFailed { timestamp_ms }
            }
        }
    }

    fn handle_exhausted(&mut self) -> Result<TickOutcome, ContractError> {
        self.stats.exhausted += 1;

        if !self.source.supports_restart() {
            warn!(source = %self.source.name(), "Source exhausted");
            observability::record_source_exhausted(false);
            return Ok(TickOutcome::Exhausted { restarted: false });
        }

        warn!(source = %self.source.name(), "Replay exhausted, restarting from the beginning");
        self.source.restart()?;
        self.stats.restarts += 1;
        observability::record_source_exhausted(true);

        Ok(TickOutcome::Exhausted { restarted: true })
    }

    /// Release the source, then flush and close the sink
    pub async fn close(&mut self) -> Result<(), ContractError> {
        self.source.close();
        self.recorder.close().await?;
        info!(source = %self.source.name(), "Acquisition session closed");
        Ok(())
    }
}
