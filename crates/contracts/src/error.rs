//! Layered error definitions
//!
//! Categorized by source: config / source / driver / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Replay log or live sensor could not be opened at startup
    #[error("source '{source_name}' open error: {message}")]
    SourceOpen {
        source_name: String,
        message: String,
    },

    /// Candidate hex frame had the wrong length or invalid digits
    #[error("malformed frame at line {line}: {message}")]
    MalformedFrame { line: u64, message: String },

    /// Sensor driver could not produce a reading
    #[error("driver '{driver}' failure: {message}")]
    DriverFailure { driver: String, message: String },

    // ===== Sink Errors =====
    /// Output destination could not be created or opened at startup
    #[error("sink '{sink_name}' open error: {message}")]
    SinkOpen { sink_name: String, message: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source open error
    pub fn source_open(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceOpen {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create malformed frame error
    pub fn malformed_frame(line: u64, message: impl Into<String>) -> Self {
        Self::MalformedFrame {
            line,
            message: message.into(),
        }
    }

    /// Create driver failure
    pub fn driver_failure(driver: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DriverFailure {
            driver: driver.into(),
            message: message.into(),
        }
    }

    /// Create sink open error
    pub fn sink_open(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkOpen {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort startup.
    ///
    /// Only the two open errors are fatal; everything else is absorbed by the
    /// acquisition loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SourceOpen { .. } | Self::SinkOpen { .. })
    }
}
