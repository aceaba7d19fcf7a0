//! Error types for the audit engine.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using `AuditError`.
pub type AuditResult<T> = Result<T, AuditError>;

/// Failure reaching or parsing a directory response.
///
/// The engine treats every variant the same way: the unit of work that
/// triggered it (one identity, one group) is downgraded to an empty result.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Network-level failure (connect, TLS, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status returned by the directory.
    #[error("Directory returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Malformed payload: {0}")]
    Payload(String),

    /// The call did not complete within the configured timeout.
    #[error("Directory call timed out after {0:?}")]
    Timeout(Duration),
}

impl DirectoryError {
    /// Returns true if the directory reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Payload(e.to_string())
    }
}

/// Errors surfaced to callers of the audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No identity matches the requested principal name.
    #[error("No identity found with principal name '{0}'")]
    NotFound(String),

    /// Directory failure that could not be contained to a single unit of work.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Report export failure.
    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for AuditError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<std::io::Error> for AuditError {
    fn from(e: std::io::Error) -> Self {
        Self::Export(e.to_string())
    }
}
