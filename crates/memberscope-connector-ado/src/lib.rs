//! Azure DevOps connector for memberscope
//!
//! Implements [`memberscope_core::DirectoryClient`] on top of the Azure DevOps
//! Graph REST API (`vssps.dev.azure.com/{org}/_apis/graph`).
//!
//! # Features
//!
//! - PAT (Basic) authentication
//! - User listing with `x-ms-continuationtoken` pagination
//! - Upward membership queries and group lookups
//! - Retry with exponential backoff, jitter and `Retry-After` on 429/5xx
//!
//! # Example
//!
//! ```no_run
//! use memberscope_connector_ado::{AdoConfig, AdoCredentials, AdoDirectory};
//! use memberscope_core::{AuditConfig, Auditor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AdoConfig::builder().organization("contoso").build()?;
//! let credentials = AdoCredentials::new(std::env::var("AZURE_DEVOPS_PAT")?);
//! let directory = AdoDirectory::new(&config, &credentials)?;
//!
//! let audit = AuditConfig::builder().organization("contoso").build()?;
//! let report = Auditor::new(&directory, audit).audit_one("jane@contoso.com").await?;
//! println!("{} groups", report.summary.records);
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod directory;
mod error;
mod graph_client;
mod rate_limit;

// Re-exports
pub use auth::basic_auth_header;
pub use config::{
    AdoConfig, AdoConfigBuilder, AdoCredentials, DEFAULT_API_VERSION, DEFAULT_REQUEST_TIMEOUT,
};
pub use directory::{AdoDirectory, MembershipEdge};
pub use error::{AdoError, AdoResult};
pub use graph_client::{GraphClient, GraphResponse, ListResponse, CONTINUATION_HEADER};
pub use rate_limit::{is_retryable, RetryConfig, RetryPolicy};
