//! Error types for capture operations.
//!
//! This module defines [`Error`], the primary error type for the log store
//! and the request dispatcher, along with a convenient [`Result`] type alias.

/// Error type for capture operations.
///
/// # Error Categories
///
/// - [`Storage`](Error::Storage): Filesystem failures while creating the
///   storage directory, reading a log, or appending to it.
/// - [`InvalidInput`](Error::InvalidInput): The caller sent something we
///   refuse to store, such as a body that is not JSON or a topic name that
///   would escape the storage directory.
/// - [`Internal`](Error::Internal): Unexpected internal errors that indicate
///   bugs or invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Filesystem errors from the log store.
    ///
    /// Permission denied, disk full and invalid paths all land here. The
    /// store never retries; the caller decides how to report it.
    Storage(String),

    /// Invalid input or parameter errors.
    InvalidInput(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, Error>;
