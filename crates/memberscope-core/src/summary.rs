//! Run totals for an audit.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// How one identity's audit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    /// Memberships resolved; group-level failures may still have occurred.
    Processed,
    /// The membership query failed; reported as having no memberships.
    MembershipFailed,
    /// Not audited because the run was cancelled.
    Skipped,
}

/// Counters gathered while auditing one identity.
#[derive(Debug, Clone)]
pub struct IdentityOutcome {
    pub status: IdentityStatus,
    pub groups_discovered: usize,
    pub groups_resolved: usize,
    pub groups_failed: usize,
    pub groups_excluded: usize,
    pub nested_lookups_failed: usize,
    pub reconverged: usize,
}

impl IdentityOutcome {
    #[must_use]
    pub fn new(status: IdentityStatus) -> Self {
        Self {
            status,
            groups_discovered: 0,
            groups_resolved: 0,
            groups_failed: 0,
            groups_excluded: 0,
            nested_lookups_failed: 0,
            reconverged: 0,
        }
    }
}

/// Totals of identities and groups attempted versus succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub identities_total: usize,
    pub identities_processed: usize,
    pub identities_failed: usize,
    pub identities_skipped: usize,
    pub groups_discovered: usize,
    pub groups_resolved: usize,
    pub groups_failed: usize,
    pub groups_excluded: usize,
    pub nested_lookups_failed: usize,
    pub reconverged_edges: usize,
    /// Membership rows, not counting placeholder rows.
    pub records: usize,
    pub sentinel_records: usize,
    pub cache_hits: usize,
    pub cache_fetches: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl AuditSummary {
    #[must_use]
    pub fn new(identities_total: usize) -> Self {
        Self {
            identities_total,
            ..Default::default()
        }
    }

    /// Adds one identity's counters.
    pub fn absorb(&mut self, outcome: &IdentityOutcome) {
        match outcome.status {
            IdentityStatus::Processed => self.identities_processed += 1,
            IdentityStatus::MembershipFailed => self.identities_failed += 1,
            IdentityStatus::Skipped => self.identities_skipped += 1,
        }
        self.groups_discovered += outcome.groups_discovered;
        self.groups_resolved += outcome.groups_resolved;
        self.groups_failed += outcome.groups_failed;
        self.groups_excluded += outcome.groups_excluded;
        self.nested_lookups_failed += outcome.nested_lookups_failed;
        self.reconverged_edges += outcome.reconverged;
    }

    /// Returns true if every identity and group was resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled
            && self.identities_failed == 0
            && self.identities_skipped == 0
            && self.groups_failed == 0
            && self.nested_lookups_failed == 0
    }
}

impl fmt::Display for AuditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "identities {}/{} processed ({} failed, {} skipped), groups {} resolved of {} discovered ({} failed, {} excluded), {} records",
            self.identities_processed,
            self.identities_total,
            self.identities_failed,
            self.identities_skipped,
            self.groups_resolved,
            self.groups_discovered,
            self.groups_failed,
            self.groups_excluded,
            self.records
        )
    }
}
