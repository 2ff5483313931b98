//! # Dispatcher
//!
//! 记录输出模块。
//!
//! 负责：
//! - 过滤有效 zone (`Recorder`)
//! - 追加写入 sinks (`CsvSink`, `LogSink`)
//! - 输出 hex 调试 trace

pub mod error;
pub mod metrics;
pub mod recorder;
pub mod sinks;
pub mod trace;

pub use contracts::{RecordSink, ZoneRecord};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use recorder::Recorder;
pub use sinks::{open_sink, ConfiguredSink, CsvSink, LogSink, MemorySink};
pub use trace::HexTrace;
