//! This module defines all error types used throughout the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data source errors
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Object or transaction decoding errors
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file parsing errors
    #[error("Configuration parsing error in {file:?}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// Missing configuration
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Decode failures raised while reading auction objects and transactions.
///
/// None of these escape the classifier: it turns them into `None` and logs
/// the reason. The state derivator hands them back so the caller can mark
/// the object as unavailable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Object snapshot lacks required fields or a parseable type
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// No recognized call, or the recognized call has the wrong shape
    #[error("unrecognized transaction shape: {0}")]
    UnrecognizedTransactionShape(String),

    /// A call-specific invariant does not hold (missing precursor or effect)
    #[error("inconsistent protocol state: {0}")]
    InconsistentProtocolState(String),

    /// A call argument points to a missing input or has the wrong kind
    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    /// Invalid BCS payload
    #[error("BCS decoding error: {0}")]
    Bcs(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a data source error
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSource(msg.into())
    }
}

impl DecodeError {
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::MalformedSnapshot(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::UnrecognizedTransactionShape(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentProtocolState(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        Self::MalformedArgument(msg.into())
    }

    /// Whether the failure points at an unexpected protocol shape worth a warning
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, DecodeError::InconsistentProtocolState(_))
    }
}

impl From<bcs::Error> for DecodeError {
    fn from(err: bcs::Error) -> Self {
        DecodeError::Bcs(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse {
            file: PathBuf::from("unknown"),
            message: err.to_string(),
        }
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}
