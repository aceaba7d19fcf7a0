//! Identity enumeration across paginated listings.

use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::directory::{pace, with_timeout, DirectoryClient};
use crate::error::{AuditError, AuditResult, DirectoryError};
use crate::model::{Identity, SubjectEntry, USER_SUBJECT_KIND};

/// Produces the full set of user identities from a directory.
///
/// Every call re-enumerates from the first page; no cursor is kept between calls.
pub struct IdentityLister<'a, D: ?Sized> {
    client: &'a D,
    page_delay: Duration,
    call_timeout: Option<Duration>,
}

impl<'a, D: DirectoryClient + ?Sized> IdentityLister<'a, D> {
    #[must_use]
    pub fn new(client: &'a D, page_delay: Duration, call_timeout: Option<Duration>) -> Self {
        Self {
            client,
            page_delay,
            call_timeout,
        }
    }

    /// Walks every listing page, passing each page's qualifying identities to `callback`.
    ///
    /// Only a missing continuation cursor ends the walk; empty pages that carry
    /// a cursor are followed.
    pub async fn for_each_page<F>(&self, mut callback: F) -> Result<usize, DirectoryError>
    where
        F: FnMut(Vec<Identity>),
    {
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = with_timeout(
                self.call_timeout,
                self.client.list_identities_page(cursor.as_deref()),
            )
            .await?;
            pages += 1;

            let raw = page.entries.len();
            let identities: Vec<Identity> = page.entries.into_iter().filter_map(qualify).collect();
            debug!(
                page = pages,
                raw,
                kept = identities.len(),
                "Processed identity page"
            );
            callback(identities);

            match page.next_cursor {
                Some(next) => {
                    cursor = Some(next);
                    pace(self.page_delay).await;
                }
                None => return Ok(pages),
            }
        }
    }

    /// Lists every qualifying identity in listing order.
    #[instrument(skip(self))]
    pub async fn list_identities(&self) -> Result<Vec<Identity>, DirectoryError> {
        let mut all = Vec::new();
        let pages = self.for_each_page(|page| all.extend(page)).await?;
        info!(identities = all.len(), pages, "Identity listing complete");
        Ok(all)
    }

    /// Finds the identity whose principal name matches `principal_name`, ignoring case.
    #[instrument(skip(self))]
    pub async fn find_by_principal(&self, principal_name: &str) -> AuditResult<Identity> {
        let wanted = principal_name.trim().to_lowercase();
        let identities = self.list_identities().await?;
        identities
            .into_iter()
            .find(|identity| identity.principal_name.to_lowercase() == wanted)
            .ok_or_else(|| AuditError::NotFound(principal_name.to_string()))
    }
}

/// Converts a raw entry into an identity if it is a user with a descriptor and
/// an email-like principal name.
#[must_use]
pub fn qualify(entry: SubjectEntry) -> Option<Identity> {
    if entry.subject_kind.as_deref() != Some(USER_SUBJECT_KIND)
        || entry.descriptor.trim().is_empty()
    {
        return None;
    }
    let principal_name = entry.principal_name.filter(|p| p.contains('@'))?;

    Some(Identity {
        descriptor: entry.descriptor,
        principal_name,
        display_name: entry.display_name,
    })
}
