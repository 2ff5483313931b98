//! Sink implementations
//!
//! Contains CsvSink, LogSink and MemorySink, plus the configured sink used by
//! the binary.

mod file;
mod log;
mod memory;

pub use self::file::CsvSink;
pub use self::log::LogSink;
pub use self::memory::MemorySink;

use contracts::{ContractError, RecordSink, SinkConfig, SinkType, ZoneRecord};
use tracing::instrument;

use crate::error::DispatcherError;

/// Sink selected by configuration
pub enum ConfiguredSink {
    Csv(CsvSink),
    Log(LogSink),
}

/// Create the sink described by `config`
#[instrument(
    name = "dispatcher_open_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.kind)
)]
pub fn open_sink(config: &SinkConfig) -> Result<ConfiguredSink, DispatcherError> {
    match config.kind {
        SinkType::Csv => Ok(ConfiguredSink::Csv(CsvSink::open(&config.name, &config.path)?)),
        SinkType::Log => Ok(ConfiguredSink::Log(LogSink::new(&config.name))),
    }
}

impl RecordSink for ConfiguredSink {
    fn name(&self) -> &str {
        match self {
            Self::Csv(sink) => sink.name(),
            Self::Log(sink) => sink.name(),
        }
    }

    async fn append(&mut self, records: &[ZoneRecord]) -> Result<(), ContractError> {
        match self {
            Self::Csv(sink) => sink.append(records).await,
            Self::Log(sink) => sink.append(records).await,
        }
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Csv(sink) => sink.flush().await,
            Self::Log(sink) => sink.flush().await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Csv(sink) => sink.close().await,
            Self::Log(sink) => sink.close().await,
        }
    }
}
