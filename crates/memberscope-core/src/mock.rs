//! In-memory directory for tests and dry runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::directory::DirectoryClient;
use crate::error::DirectoryError;
use crate::model::{Group, IdentityPage, SubjectEntry, USER_SUBJECT_KIND};

/// Mock directory backed by in-memory maps.
#[derive(Debug, Default)]
pub struct MockDirectory {
    pages: Vec<Vec<SubjectEntry>>,
    memberships: HashMap<String, Vec<String>>,
    groups: HashMap<String, Group>,
    failing_memberships: HashSet<String>,
    failing_groups: HashSet<String>,
    fail_listing: bool,
    fetch_delay: Duration,
    page_requests: AtomicUsize,
    membership_requests: AtomicUsize,
    group_fetches: Mutex<HashMap<String, usize>>,
}

impl MockDirectory {
    /// Creates an empty mock directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listing page. Pages are chained with `page-N` cursors.
    #[must_use]
    pub fn with_page(mut self, entries: Vec<SubjectEntry>) -> Self {
        self.pages.push(entries);
        self
    }

    /// Adds a user entry to the last page, creating one if needed.
    #[must_use]
    pub fn with_user(mut self, descriptor: &str, principal_name: &str, display_name: &str) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(user_entry(descriptor, principal_name, display_name));
        }
        self
    }

    /// Declares the direct containers of `descriptor`.
    #[must_use]
    pub fn with_memberships(mut self, descriptor: &str, containers: &[&str]) -> Self {
        self.memberships.insert(
            descriptor.to_string(),
            containers.iter().map(|c| (*c).to_string()).collect(),
        );
        self
    }

    /// Registers a group.
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.insert(group.descriptor.clone(), group);
        self
    }

    /// Makes the membership query for `descriptor` fail.
    #[must_use]
    pub fn failing_memberships_for(mut self, descriptor: &str) -> Self {
        self.failing_memberships.insert(descriptor.to_string());
        self
    }

    /// Makes fetching `descriptor` fail.
    #[must_use]
    pub fn failing_group(mut self, descriptor: &str) -> Self {
        self.failing_groups.insert(descriptor.to_string());
        self
    }

    /// Makes every listing call fail.
    #[must_use]
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Delays every group fetch.
    #[must_use]
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Number of listing pages requested so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    /// Number of membership queries issued so far.
    pub fn membership_requests(&self) -> usize {
        self.membership_requests.load(Ordering::SeqCst)
    }

    /// Number of fetches issued for one group descriptor.
    pub fn group_fetches(&self, descriptor: &str) -> usize {
        self.group_fetches
            .lock()
            .map(|fetches| fetches.get(descriptor).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn page_index(cursor: Option<&str>) -> Result<usize, DirectoryError> {
        match cursor {
            None => Ok(0),
            Some(c) => c
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| DirectoryError::Status {
                    status: 400,
                    message: format!("invalid continuation token: {c}"),
                }),
        }
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn list_identities_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<IdentityPage, DirectoryError> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(DirectoryError::Transport("connection refused".into()));
        }

        let index = Self::page_index(cursor)?;
        let entries = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(IdentityPage {
            entries,
            next_cursor,
        })
    }

    async fn list_upward_memberships(
        &self,
        descriptor: &str,
    ) -> Result<Vec<String>, DirectoryError> {
        self.membership_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing_memberships.contains(descriptor) {
            return Err(DirectoryError::Status {
                status: 500,
                message: format!("membership lookup failed for {descriptor}"),
            });
        }
        Ok(self.memberships.get(descriptor).cloned().unwrap_or_default())
    }

    async fn fetch_group(&self, descriptor: &str) -> Result<Group, DirectoryError> {
        if let Ok(mut fetches) = self.group_fetches.lock() {
            *fetches.entry(descriptor.to_string()).or_insert(0) += 1;
        }
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        if self.failing_groups.contains(descriptor) {
            return Err(DirectoryError::Transport(format!(
                "connection reset fetching {descriptor}"
            )));
        }
        self.groups
            .get(descriptor)
            .cloned()
            .ok_or_else(|| DirectoryError::Status {
                status: 404,
                message: format!("group {descriptor} not found"),
            })
    }
}

/// Builds a user subject entry.
#[must_use]
pub fn user_entry(descriptor: &str, principal_name: &str, display_name: &str) -> SubjectEntry {
    SubjectEntry {
        descriptor: descriptor.to_string(),
        subject_kind: Some(USER_SUBJECT_KIND.to_string()),
        principal_name: Some(principal_name.to_string()),
        display_name: Some(display_name.to_string()),
    }
}

/// Builds a group with the given principal name.
#[must_use]
pub fn group(descriptor: &str, display_name: &str, principal_name: &str) -> Group {
    Group {
        descriptor: descriptor.to_string(),
        display_name: Some(display_name.to_string()),
        principal_name: principal_name.to_string(),
        description: format!("{display_name} group"),
    }
}
