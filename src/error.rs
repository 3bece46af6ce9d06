//! Error types for Procmine.
//!
//! All errors in Procmine are represented by the `ProcmineError` enum.
//! Empty input is never an error: analyzers degrade to empty or zero-filled
//! reports instead.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Procmine operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum ProcmineError {
    /// A request parameter is unknown or missing (segment mode, aggregation level, metric...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Input records cannot be analyzed as given (missing timestamp, empty id, NaN outcome).
    #[error("inconsistent data: {0}")]
    InconsistentData(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// An analysis exceeded its wall-clock budget.
    #[error("{0}")]
    Timeout(String),

    /// Engine-level errors (runtime construction, task failures).
    #[error("{0}")]
    Engine(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<ProcmineError> for String {
    fn from(val: ProcmineError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for ProcmineError {
    fn from(error: std::io::Error) -> Self {
        ProcmineError::IoError(error.to_string())
    }
}

impl From<ProcmineError> for std::io::Error {
    fn from(val: ProcmineError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for ProcmineError {
    fn from(error: serde_json::Error) -> Self {
        ProcmineError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for ProcmineError {
    fn from(error: toml::de::Error) -> Self {
        ProcmineError::Config(error.to_string())
    }
}

impl From<strum::ParseError> for ProcmineError {
    fn from(error: strum::ParseError) -> Self {
        ProcmineError::InvalidArgument(error.to_string())
    }
}
