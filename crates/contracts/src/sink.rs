//! RecordSink trait - Recorder output interface
//!
//! Defines the abstract interface for durable record stores.

use crate::{ContractError, ZoneRecord};

/// Record output trait
///
/// All sink implementations must implement this trait. Sinks are append-only:
/// prior content is always preserved.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Append records in the given order
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn append(&mut self, records: &[ZoneRecord]) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
