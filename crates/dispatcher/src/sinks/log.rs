//! LogSink - logs record batches via tracing

use contracts::{ContractError, RecordSink, ZoneRecord};
use tracing::{info, instrument};

/// Sink that logs record summaries for debugging
pub struct LogSink {
    name: String,
    batches: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: 0,
        }
    }

    fn log_batch_summary(&self, records: &[ZoneRecord]) {
        let timestamp_ms = records.first().map(|r| r.timestamp_ms);
        let nearest = records.iter().map(|r| r.distance_mm).min();

        info!(
            sink = %self.name,
            batch = self.batches,
            timestamp_ms,
            records = records.len(),
            nearest_mm = nearest,
            "Zone records received"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_append",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn append(&mut self, records: &[ZoneRecord]) -> Result<(), ContractError> {
        self.batches += 1;
        self.log_batch_summary(records);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, batches = self.batches, "LogSink closed");
        Ok(())
    }
}
