//! MemorySink - in-memory sink with injectable write failures

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{ContractError, RecordSink, ZoneRecord};

/// Sink that collects records in memory
///
/// Clones share the same storage, so a test can keep one handle while the
/// recorder owns another. Failures are injected per append call.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    name: String,
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<ZoneRecord>,
    fail_appends: usize,
    closed: bool,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::default(),
        }
    }

    /// Make the next `count` appends fail without storing anything
    pub fn fail_next(&self, count: usize) {
        self.lock().fail_appends = count;
    }

    /// Records appended so far
    pub fn records(&self) -> Vec<ZoneRecord> {
        self.lock().records.clone()
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn append(&mut self, records: &[ZoneRecord]) -> Result<(), ContractError> {
        let mut state = self.lock();
        if state.fail_appends > 0 {
            state.fail_appends -= 1;
            return Err(ContractError::sink_write(&self.name, "injected write failure"));
        }
        state.records.extend_from_slice(records);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injected_failure_then_success() {
        let mut sink = MemorySink::new("mem");
        let handle = sink.clone();
        let record = ZoneRecord {
            timestamp_ms: 0,
            zone_id: 1,
            distance_mm: 2,
            status: 9,
        };

        handle.fail_next(1);
        assert!(sink.append(&[record]).await.is_err());
        assert!(sink.append(&[record]).await.is_ok());
        assert_eq!(handle.records(), vec![record]);

        sink.close().await.unwrap();
        assert!(handle.is_closed());
    }
}
