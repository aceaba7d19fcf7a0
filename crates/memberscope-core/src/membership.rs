//! Upward membership closure using BFS with a visited set.
//!
//! Group containment graphs may reconverge (a group with several parents whose
//! chains meet again) or cycle outright, so traversal is an iterative
//! fixed-point loop over a work queue rather than recursion.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::directory::{with_timeout, DirectoryClient};
use crate::error::DirectoryError;

/// Result of resolving the groups above one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpwardMembership {
    /// Container descriptors in discovery order, without duplicates.
    pub descriptors: Vec<String>,
    /// Edges that led to an already-discovered descriptor (cycles and diamonds).
    pub reconverged: usize,
    /// Whether groups above the nesting depth limit were left out.
    pub depth_reached: bool,
    /// Nested group lookups that failed and were skipped.
    pub failed_lookups: usize,
}

/// Walks the "contained by" relation upward from an identity.
pub struct MembershipResolver<'a, D: ?Sized> {
    client: &'a D,
    expand_nested: bool,
    max_depth: u32,
    call_timeout: Option<Duration>,
}

impl<'a, D: DirectoryClient + ?Sized> MembershipResolver<'a, D> {
    #[must_use]
    pub fn new(
        client: &'a D,
        expand_nested: bool,
        max_depth: u32,
        call_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            expand_nested,
            max_depth,
            call_timeout,
        }
    }

    async fn containers(&self, descriptor: &str) -> Result<Vec<String>, DirectoryError> {
        with_timeout(
            self.call_timeout,
            self.client.list_upward_memberships(descriptor),
        )
        .await
    }

    /// Resolves every group `identity_descriptor` belongs to.
    ///
    /// A failure of the first (direct) query is returned to the caller. Failures
    /// while expanding nested groups only drop that branch.
    #[instrument(skip(self))]
    pub async fn upward_groups(
        &self,
        identity_descriptor: &str,
    ) -> Result<UpwardMembership, DirectoryError> {
        let direct = self.containers(identity_descriptor).await?;

        let mut result = UpwardMembership::default();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(identity_descriptor.to_string());

        // BFS queue: (group descriptor, nesting depth)
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();

        for descriptor in direct {
            if visited.insert(descriptor.clone()) {
                result.descriptors.push(descriptor.clone());
                queue.push_back((descriptor, 1));
            }
        }

        if !self.expand_nested {
            return Ok(result);
        }

        while let Some((group, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                // Only flag the limit when it actually hid a parent
                if let Ok(parents) = self.containers(&group).await {
                    if parents.iter().any(|parent| !visited.contains(parent)) {
                        result.depth_reached = true;
                    }
                }
                continue;
            }

            let parents = match self.containers(&group).await {
                Ok(parents) => parents,
                Err(e) => {
                    warn!(group = %group, error = %e, "Failed to expand nested group");
                    result.failed_lookups += 1;
                    continue;
                }
            };

            for parent in parents {
                if visited.insert(parent.clone()) {
                    result.descriptors.push(parent.clone());
                    queue.push_back((parent, depth + 1));
                } else {
                    result.reconverged += 1;
                }
            }
        }

        if result.depth_reached {
            warn!(
                max_depth = self.max_depth,
                "Nesting depth limit left parent groups unexplored"
            );
        }
        debug!(
            groups = result.descriptors.len(),
            reconverged = result.reconverged,
            "Membership resolution complete"
        );

        Ok(result)
    }
}
