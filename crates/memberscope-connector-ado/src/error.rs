//! Error types for the Azure DevOps connector.

use memberscope_core::DirectoryError;
use thiserror::Error;

/// Result type alias using `AdoError`.
pub type AdoResult<T> = Result<T, AdoError>;

/// Errors that can occur when talking to the Azure DevOps Graph API.
#[derive(Debug, Error)]
pub enum AdoError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The PAT was rejected.
    #[error("Authentication failed ({status}): check the personal access token")]
    Auth { status: u16 },

    /// Non-success response from the Graph API.
    #[error("Graph API error {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Retries exhausted on throttled or transient responses.
    #[error("Maximum retries ({attempts}) exceeded, last status {status}")]
    MaxRetriesExceeded { attempts: u32, status: u16 },
}

impl AdoError {
    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status }
            | Self::Api { status, .. }
            | Self::MaxRetriesExceeded { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<AdoError> for DirectoryError {
    fn from(e: AdoError) -> Self {
        match e {
            AdoError::Json(e) => Self::Payload(e.to_string()),
            AdoError::Http(e) if e.is_decode() => Self::Payload(e.to_string()),
            AdoError::Http(e) => Self::Transport(e.to_string()),
            AdoError::Auth { status } => Self::Status {
                status,
                message: "authentication failed".to_string(),
            },
            AdoError::Api { status, message } => Self::Status { status, message },
            AdoError::MaxRetriesExceeded { attempts, status } => Self::Status {
                status,
                message: format!("gave up after {attempts} retries"),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}
