//! CLI error types and exit codes

use memberscope_connector_ado::AdoError;
use memberscope_core::{AuditError, DirectoryError};
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error (configuration, I/O, export)
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Not found
/// - 5: Server error
/// - 130: Interrupted
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No Azure DevOps personal access token configured.")]
    MissingPat,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify the organization name is correct\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Interrupted: partial results only")]
    Cancelled,
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Export(_) | CliError::Io(_) => 1,
            CliError::MissingPat | CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::NotFound(_) => 4,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Cancelled => 130,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::MissingPat => {
                Some("Set MEMBERSCOPE_PAT or AZURE_DEVOPS_PAT to a token with Graph (read) scope.")
            }
            CliError::AuthenticationFailed(_) => {
                Some("Check that the token has not expired and has Graph (read) scope.")
            }
            CliError::NotFound(_) => Some("Principal names are matched ignoring case; check the spelling."),
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            _ => None,
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Transport(msg) => CliError::ConnectionFailed(msg),
            DirectoryError::Timeout(limit) => {
                CliError::Network(format!("Request timed out after {limit:?}"))
            }
            DirectoryError::Payload(msg) => {
                CliError::Network(format!("Malformed response: {msg}"))
            }
            DirectoryError::Status { status, message } if matches!(status, 203 | 401 | 403) => {
                CliError::AuthenticationFailed(format!("status {status}: {message}"))
            }
            DirectoryError::Status { status, message } => CliError::Api { status, message },
        }
    }
}

impl From<AuditError> for CliError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::Config(msg) => CliError::Config(msg),
            AuditError::NotFound(principal) => {
                CliError::NotFound(format!("no identity with principal name '{principal}'"))
            }
            AuditError::Directory(e) => e.into(),
            AuditError::Export(msg) => CliError::Export(msg),
        }
    }
}

impl From<AdoError> for CliError {
    fn from(e: AdoError) -> Self {
        match e {
            AdoError::Config(msg) => CliError::Config(msg),
            AdoError::Url(e) => CliError::Config(format!("Invalid URL: {e}")),
            other => DirectoryError::from(other).into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Config(format!("YAML error: {}", e))
    }
}
