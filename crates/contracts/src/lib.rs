//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the acquisition
//! workspace: frame and record types, the source/sink/driver traits and the
//! configuration blueprint. Business crates depend on this crate only; reverse
//! dependencies are prohibited.
//!
//! ## Time Model
//! - Records carry a session-relative timestamp in whole milliseconds
//! - The timestamp is produced by the acquisition loop's clock, never by a source

mod blueprint;
mod error;
mod frame;
mod sensor_source;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use frame::*;
pub use sensor_source::{FrameSource, SensorDriver, SourcePoll};
pub use sink::*;
