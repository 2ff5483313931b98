//! Hex debug trace
//!
//! Echoes every acquired frame pair as two hex lines in the same shape the
//! firmware prints, so a captured trace can be fed back in as a replay log.

use std::io::{self, Write};

use contracts::{FramePair, TraceConfig};
use ingestion::codec;

/// Plain-text hex trace writer
pub struct HexTrace {
    out: Option<Box<dyn Write + Send>>,
    distance_prefix: String,
    status_prefix: String,
}

impl HexTrace {
    /// Trace to an arbitrary writer
    pub fn new(out: Box<dyn Write + Send>, config: &TraceConfig) -> Self {
        Self {
            out: config.enabled.then_some(out),
            distance_prefix: config.distance_prefix.clone(),
            status_prefix: config.status_prefix.clone(),
        }
    }

    /// Trace to stdout
    pub fn stdout(config: &TraceConfig) -> Self {
        Self::new(Box::new(io::stdout()), config)
    }

    /// A trace that writes nothing
    pub fn disabled() -> Self {
        Self {
            out: None,
            distance_prefix: String::new(),
            status_prefix: String::new(),
        }
    }

    /// Whether anything is written
    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    /// Write the distance line then the status line
    pub fn emit(&mut self, frame: &FramePair) -> io::Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };

        writeln!(out, "{}: \t{}", self.distance_prefix, codec::encode(&frame.distance))?;
        writeln!(out, "{}: \t{}", self.status_prefix, codec::encode(&frame.status))?;
        out.flush()
    }
}
