//! Directory client abstraction consumed by the audit engine.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::model::{Group, IdentityPage};

/// Read-only access to a directory service.
///
/// Implementations own transport concerns: authentication, retries and
/// backoff. The engine only sees pages and descriptors.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetches one page of subjects, starting at `cursor` (or the beginning).
    async fn list_identities_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<IdentityPage, DirectoryError>;

    /// Returns the container descriptors of `descriptor` (direction "up").
    async fn list_upward_memberships(
        &self,
        descriptor: &str,
    ) -> Result<Vec<String>, DirectoryError>;

    /// Fetches metadata for a single group.
    async fn fetch_group(&self, descriptor: &str) -> Result<Group, DirectoryError>;
}

/// Runs a directory call under an optional deadline.
pub(crate) async fn with_timeout<T, F>(
    limit: Option<Duration>,
    call: F,
) -> Result<T, DirectoryError>
where
    F: Future<Output = Result<T, DirectoryError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| DirectoryError::Timeout(limit))?,
        None => call.await,
    }
}

/// Sleeps for `delay` unless it is zero.
pub(crate) async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
