//! Recorder - 过滤有效 zone 并写入 sink

use std::sync::Arc;

use contracts::{ContractError, FramePair, RecordSink, ZoneRecord};
use metrics::counter;
use tracing::{debug, instrument};

use crate::metrics::SinkMetrics;

/// Record filter in front of a sink
///
/// Keeps only zones whose status is 5 or 9 and appends them, in ascending
/// zone order, as one batch per frame.
pub struct Recorder<S> {
    sink: S,
    metrics: Arc<SinkMetrics>,
}

impl<S: RecordSink> Recorder<S> {
    /// Wrap a sink
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<SinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The wrapped sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Persist the valid zones of `frame` stamped with `timestamp_ms`
    ///
    /// Returns the number of records appended. A frame without valid zones
    /// writes nothing and is not an error.
    ///
    /// # Errors
    /// The sink's write error; nothing from this frame is retried.
    #[instrument(
        name = "recorder_persist",
        skip(self, frame),
        fields(sink = %self.sink.name())
    )]
    pub async fn persist(
        &mut self,
        frame: &FramePair,
        timestamp_ms: u64,
    ) -> Result<usize, ContractError> {
        let records = ZoneRecord::from_frame(frame, timestamp_ms);

        if records.is_empty() {
            self.metrics.inc_empty_frames();
            debug!("Frame has no valid zone");
            return Ok(0);
        }

        match self.sink.append(&records).await {
            Ok(()) => {
                self.metrics.record_persisted(records.len());
                counter!("tof_records_written_total").increment(records.len() as u64);
                Ok(records.len())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                counter!("tof_sink_write_failures_total").increment(1);
                Err(e)
            }
        }
    }

    /// Flush and close the sink
    pub async fn close(&mut self) -> Result<(), ContractError> {
        self.sink.flush().await?;
        self.sink.close().await
    }
}
