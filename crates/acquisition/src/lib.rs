//! # Acquisition
//!
//! The periodic acquisition loop: poll a frame source, echo the frame as a
//! hex trace, persist its valid zones, and on exhaustion rewind the replay.
//!
//! ## Usage Example
//!
//! ```ignore
//! use acquisition::{AcquisitionLoop, AcquisitionSession};
//! use dispatcher::HexTrace;
//! use tokio::sync::watch;
//!
//! let session = AcquisitionSession::new(source, sink, HexTrace::stdout(&blueprint.trace));
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let stats = AcquisitionLoop::new(&blueprint.acquisition)
//!     .run(session, shutdown_rx)
//!     .await?;
//! ```

mod clock;
mod engine;
mod session;
mod stats;

pub use clock::{Clock, ManualClock, SessionClock};
pub use engine::AcquisitionLoop;
pub use session::{AcquisitionSession, TickOutcome};
pub use stats::AcquisitionStats;
