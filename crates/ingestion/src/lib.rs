//! # Ingestion
//!
//! Frame pair sources for the acquisition loop.
//!
//! Responsibilities:
//! - Decode the serial hex wire format (`codec`)
//! - Replay captured serial logs (`ReplaySource`)
//! - Read a live sensor through a `SensorDriver` (`LiveSource`)
//! - Provide a deterministic `MockDriver` for tests and demos
//! - Summarize a whole log without persisting it (`LogSummary`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{FrameSource, MalformedPolicy, SourcePoll};
//! use ingestion::ReplaySource;
//!
//! let mut source = ReplaySource::open(path, MalformedPolicy::Skip)?;
//! while let SourcePoll::Frame(frame) = source.poll_frame() {
//!     println!("{} valid zones", frame.valid_zone_count());
//! }
//! ```

pub mod codec;
mod config;
mod error;
mod live;
mod mock;
mod replay;
mod summary;

// Re-exports
pub use config::{IngestionMetrics, MalformedPolicy, MetricsSnapshot};
pub use error::{HexError, IngestionError, Result};
pub use live::LiveSource;
pub use mock::MockDriver;
pub use replay::ReplaySource;
pub use summary::{LogSummary, SummaryBuilder};
