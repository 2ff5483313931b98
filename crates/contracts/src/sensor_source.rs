//! FrameSource / SensorDriver traits - frame source abstraction
//!
//! Defines a unified interface for where frame pairs come from, decoupling the
//! acquisition loop from the concrete origin of the bytes. Log replay and the
//! live sensor are handled uniformly.

use crate::{ContractError, FramePair};

/// Result of one poll of a frame source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePoll {
    /// A complete, validated frame pair
    Frame(FramePair),

    /// The replay input has no further complete pair (replay only)
    Exhausted,

    /// The source could not produce a reading this time (live only)
    Failure(String),
}

/// Frame pair source trait
///
/// Abstracts the common behavior of the log replay and the live sensor.
///
/// # Design Principles
///
/// 1. **Pull model**: the acquisition loop polls once per tick
/// 2. **Unified Interface**: replay and live sources use the same API
/// 3. **No panics on bad data**: malformed input is absorbed by the source
///
/// # Example
///
/// ```ignore
/// let mut source: Box<dyn FrameSource> = open_source(&blueprint.source)?;
/// match source.poll_frame() {
///     SourcePoll::Frame(frame) => persist(frame),
///     SourcePoll::Exhausted => source.restart()?,
///     SourcePoll::Failure(reason) => warn!(%reason, "no reading"),
/// }
/// ```
pub trait FrameSource: Send {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Produce the next frame pair, or signal exhaustion / failure
    fn poll_frame(&mut self) -> SourcePoll;

    /// Whether [`FrameSource::restart`] is meaningful for this source
    fn supports_restart(&self) -> bool {
        false
    }

    /// Reset the read position to the beginning of the input
    ///
    /// After a restart the next poll returns the same frame pair as the first
    /// poll of the session. Sources without a replayable input return `Ok(())`
    /// and do nothing.
    fn restart(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Release the underlying handle
    fn close(&mut self) {}
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn poll_frame(&mut self) -> SourcePoll {
        (**self).poll_frame()
    }

    fn supports_restart(&self) -> bool {
        (**self).supports_restart()
    }

    fn restart(&mut self) -> Result<(), ContractError> {
        (**self).restart()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Sensor driver capability
///
/// The register-level driver of the physical sensor is out of scope; this is
/// the surface the live source needs from it.
pub trait SensorDriver: Send {
    /// Driver name (used for logging)
    fn name(&self) -> &str;

    /// Initialize the sensor (register setup, firmware upload)
    fn init(&mut self) -> Result<(), ContractError>;

    /// Start continuous ranging
    fn start_ranging(&mut self) -> Result<(), ContractError>;

    /// Fetch the current distance and status buffers
    fn read_frame(&mut self) -> Result<FramePair, ContractError>;

    /// Stop ranging
    fn stop_ranging(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
