//! Audit orchestration: identities → memberships → groups → scope → records.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::AuditConfig;
use crate::directory::{pace, DirectoryClient};
use crate::error::AuditResult;
use crate::groups::{GroupCache, GroupResolver};
use crate::lister::IdentityLister;
use crate::membership::MembershipResolver;
use crate::model::{AuditRecord, Identity};
use crate::scope::ScopeClassifier;
use crate::summary::{AuditSummary, IdentityOutcome, IdentityStatus};

/// Records and totals produced by one audit run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub records: Vec<AuditRecord>,
    pub summary: AuditSummary,
}

/// Runs membership audits against a directory.
pub struct Auditor<'a, D: ?Sized> {
    client: &'a D,
    config: AuditConfig,
    classifier: ScopeClassifier,
    cancel: CancellationToken,
}

impl<'a, D: DirectoryClient + ?Sized> Auditor<'a, D> {
    #[must_use]
    pub fn new(client: &'a D, config: AuditConfig) -> Self {
        let classifier = ScopeClassifier::from_config(&config);
        Self {
            client,
            config,
            classifier,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the run between identities and between group fetches.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Returns a lister over the audited directory.
    #[must_use]
    pub fn lister(&self) -> IdentityLister<'_, D> {
        IdentityLister::new(self.client, self.config.page_delay, self.config.call_timeout)
    }

    /// Lists every identity in the directory.
    pub async fn list_identities(&self) -> AuditResult<Vec<Identity>> {
        Ok(self.lister().list_identities().await?)
    }

    /// Counts identities without holding the whole listing.
    pub async fn count_identities(&self) -> AuditResult<usize> {
        let mut count = 0;
        self.lister()
            .for_each_page(|page| count += page.len())
            .await?;
        Ok(count)
    }

    /// Audits the identity whose principal name matches `principal_name`.
    ///
    /// Returns `AuditError::NotFound` without producing records if nothing matches.
    #[instrument(skip(self))]
    pub async fn audit_one(&self, principal_name: &str) -> AuditResult<AuditReport> {
        let identity = self.lister().find_by_principal(principal_name).await?;
        info!(principal = %identity.principal_name, "Found identity");
        Ok(self.run_audit(std::slice::from_ref(&identity)).await)
    }

    /// Audits every identity in the directory.
    #[instrument(skip(self))]
    pub async fn audit_all(&self) -> AuditResult<AuditReport> {
        let identities = self.list_identities().await?;
        info!(identities = identities.len(), "Starting full membership audit");
        Ok(self.run_audit(&identities).await)
    }

    /// Audits `identities` in order. Never fails: unit-level errors are counted.
    pub async fn run_audit(&self, identities: &[Identity]) -> AuditReport {
        let started = Instant::now();
        let total = identities.len();

        // One cache per run
        let cache = GroupCache::new();
        let groups = GroupResolver::new(self.client, &cache, self.config.call_timeout);
        let memberships = MembershipResolver::new(
            self.client,
            self.config.expand_nested,
            self.config.max_nesting_depth,
            self.config.call_timeout,
        );

        let outcomes: Vec<(Vec<AuditRecord>, IdentityOutcome)> =
            stream::iter(identities.iter().enumerate())
                .map(|(idx, identity)| {
                    self.audit_identity(idx, total, identity, &memberships, &groups)
                })
                .buffered(self.config.concurrency)
                .collect()
                .await;

        let mut report = AuditReport {
            records: Vec::new(),
            summary: AuditSummary::new(total),
        };
        for (records, outcome) in outcomes {
            report.summary.absorb(&outcome);
            report.records.extend(records);
        }

        let summary = &mut report.summary;
        summary.sentinel_records = report.records.iter().filter(|r| r.is_sentinel()).count();
        summary.records = report.records.len() - summary.sentinel_records;
        summary.cache_hits = cache.hits();
        summary.cache_fetches = cache.fetches();
        summary.cancelled = self.cancel.is_cancelled() && summary.identities_skipped > 0;
        summary.elapsed = started.elapsed();

        info!(
            identities_total = summary.identities_total,
            identities_processed = summary.identities_processed,
            identities_failed = summary.identities_failed,
            identities_skipped = summary.identities_skipped,
            groups_discovered = summary.groups_discovered,
            groups_failed = summary.groups_failed,
            records = summary.records,
            cancelled = summary.cancelled,
            "Audit complete"
        );

        report
    }

    fn is_excluded(&self, display_name: &str) -> bool {
        self.config
            .excluded_groups
            .iter()
            .any(|excluded| excluded == display_name)
    }

    async fn audit_identity(
        &self,
        idx: usize,
        total: usize,
        identity: &Identity,
        memberships: &MembershipResolver<'_, D>,
        groups: &GroupResolver<'_, D>,
    ) -> (Vec<AuditRecord>, IdentityOutcome) {
        if self.cancel.is_cancelled() {
            return (Vec::new(), IdentityOutcome::new(IdentityStatus::Skipped));
        }

        if idx == 0 || (idx + 1) % 10 == 0 {
            info!(
                "Processing identity {}/{}: {}",
                idx + 1,
                total,
                identity.principal_name
            );
        }

        let upward = match memberships.upward_groups(&identity.descriptor).await {
            Ok(upward) => upward,
            Err(e) => {
                warn!(
                    principal = %identity.principal_name,
                    error = %e,
                    "Failed to get groups"
                );
                pace(self.config.identity_delay).await;
                return (
                    vec![AuditRecord::no_memberships(identity)],
                    IdentityOutcome::new(IdentityStatus::MembershipFailed),
                );
            }
        };

        let mut outcome = IdentityOutcome::new(IdentityStatus::Processed);
        outcome.groups_discovered = upward.descriptors.len();
        outcome.nested_lookups_failed = upward.failed_lookups;
        outcome.reconverged = upward.reconverged;

        let mut records = Vec::with_capacity(upward.descriptors.len());
        for descriptor in &upward.descriptors {
            if self.cancel.is_cancelled() {
                debug!(principal = %identity.principal_name, "Cancelled mid-identity");
                return (Vec::new(), IdentityOutcome::new(IdentityStatus::Skipped));
            }

            let group = match groups.resolve_group(descriptor).await {
                Ok(group) => group,
                Err(e) => {
                    warn!(
                        principal = %identity.principal_name,
                        group = %descriptor,
                        error = %e,
                        "Error processing group"
                    );
                    outcome.groups_failed += 1;
                    continue;
                }
            };
            outcome.groups_resolved += 1;

            if self.is_excluded(group.display_name()) {
                outcome.groups_excluded += 1;
                continue;
            }

            let scope = self.classifier.classify(&group);
            debug!(
                group = group.display_name(),
                scope_type = %scope.scope_type,
                scope_name = %scope.scope_name,
                "Classified group"
            );
            records.push(AuditRecord::membership(identity, &group, scope));
        }

        if records.is_empty() {
            records.push(AuditRecord::no_memberships(identity));
        }

        pace(self.config.identity_delay).await;
        (records, outcome)
    }
}
