//! Error types for CLI operations.

use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration rejected after CLI overrides were applied
    #[error("Configuration invalid after overrides: {0}")]
    Overrides(#[source] ContractError),

    /// Frame source could not be opened
    #[error("Failed to open frame source: {0}")]
    SourceOpen(#[source] ContractError),

    /// Record sink could not be opened
    #[error("Failed to open record sink: {0}")]
    SinkOpen(#[source] ContractError),

    /// Log scanned by `inspect` holds no frame pair
    #[error("No ToF frame pairs found in {path}")]
    EmptyLog { path: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn empty_log(path: impl Into<String>) -> Self {
        Self::EmptyLog { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
