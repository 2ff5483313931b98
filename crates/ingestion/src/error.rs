//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Hex frame decode error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// Digit count (after stripping the terminator) is not `2 * expected bytes`
    #[error("malformed length: expected {expected} hex chars, got {actual}")]
    MalformedLength {
        /// Expected number of hex characters
        expected: usize,
        /// Actual number of characters
        actual: usize,
    },

    /// A character is not a hexadecimal digit
    #[error("malformed digit {character:?} at index {index}")]
    MalformedDigit {
        /// Position of the offending character
        index: usize,
        /// The offending character
        character: char,
    },
}

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Replay log could not be opened
    #[error("failed to open replay log '{path}': {source}")]
    ReplayOpen {
        /// Log path
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Sensor driver could not be brought up
    #[error("sensor driver '{driver}' failed to start: {message}")]
    DriverStart {
        /// Driver name
        driver: String,
        /// 错误消息
        message: String,
    },

    /// Source was used after `close`
    #[error("source {name} is closed")]
    Closed {
        /// Source name
        name: String,
    },

    /// Source reported a failed read while being scanned
    #[error("source {name} read failed: {reason}")]
    ReadFailure {
        /// Source name
        name: String,
        /// Failure reason
        reason: String,
    },

    /// IO error while reading the input
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::ReplayOpen { path, source } => {
                ContractError::source_open(path, source.to_string())
            }
            IngestionError::DriverStart { driver, message } => {
                ContractError::source_open(driver, message)
            }
            IngestionError::Closed { name } => ContractError::Other(format!("source {name} is closed")),
            IngestionError::ReadFailure { name, reason } => {
                ContractError::Other(format!("source {name} read failed: {reason}"))
            }
            IngestionError::Io(e) => ContractError::Io(e),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
