//! Group metadata resolution with a run-scoped, single-flight cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::directory::{with_timeout, DirectoryClient};
use crate::error::DirectoryError;
use crate::model::Group;

/// Group metadata cache keyed by descriptor.
///
/// Each descriptor owns one `OnceCell`, so concurrent lookups of the same
/// group share a single fetch. A failed fetch leaves the cell empty and the
/// next lookup tries again. One cache lives for exactly one audit run.
#[derive(Debug, Default)]
pub struct GroupCache {
    entries: DashMap<String, Arc<OnceCell<Arc<Group>>>>,
    hits: AtomicUsize,
    fetches: AtomicUsize,
}

impl GroupCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups fetched and cached.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Fetches issued to the directory.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Returns a cached group without fetching.
    pub fn get(&self, descriptor: &str) -> Option<Arc<Group>> {
        self.entries
            .get(descriptor)
            .and_then(|cell| cell.get().cloned())
    }

    fn slot(&self, descriptor: &str) -> Arc<OnceCell<Arc<Group>>> {
        self.entries
            .entry(descriptor.to_string())
            .or_default()
            .value()
            .clone()
    }
}

/// Fetches group metadata, cache-first.
pub struct GroupResolver<'a, D: ?Sized> {
    client: &'a D,
    cache: &'a GroupCache,
    call_timeout: Option<Duration>,
}

impl<'a, D: DirectoryClient + ?Sized> GroupResolver<'a, D> {
    #[must_use]
    pub fn new(client: &'a D, cache: &'a GroupCache, call_timeout: Option<Duration>) -> Self {
        Self {
            client,
            cache,
            call_timeout,
        }
    }

    /// Returns metadata for `descriptor`, fetching it on first use.
    #[instrument(skip(self))]
    pub async fn resolve_group(&self, descriptor: &str) -> Result<Arc<Group>, DirectoryError> {
        let slot = self.cache.slot(descriptor);

        if let Some(group) = slot.get() {
            self.cache.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Group cache hit");
            return Ok(Arc::clone(group));
        }

        let group = slot
            .get_or_try_init(|| async {
                self.cache.fetches.fetch_add(1, Ordering::Relaxed);
                let mut group =
                    with_timeout(self.call_timeout, self.client.fetch_group(descriptor)).await?;
                if group.descriptor.is_empty() {
                    group.descriptor = descriptor.to_string();
                }
                Ok::<_, DirectoryError>(Arc::new(group))
            })
            .await?;

        Ok(Arc::clone(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{group, MockDirectory};

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let directory = MockDirectory::new().with_group(group("vssgp.a", "Readers", "[P]\\Readers"));
        let cache = GroupCache::new();
        let resolver = GroupResolver::new(&directory, &cache, None);

        let first = resolver.resolve_group("vssgp.a").await.unwrap();
        let second = resolver.resolve_group("vssgp.a").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(directory.group_fetches("vssgp.a"), 1);
        assert_eq!(cache.fetches(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let directory = MockDirectory::new().failing_group("vssgp.bad");
        let cache = GroupCache::new();
        let resolver = GroupResolver::new(&directory, &cache, None);

        assert!(resolver.resolve_group("vssgp.bad").await.is_err());
        assert!(resolver.resolve_group("vssgp.bad").await.is_err());

        assert_eq!(directory.group_fetches("vssgp.bad"), 2);
        assert!(cache.get("vssgp.bad").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_fetch() {
        let directory = MockDirectory::new()
            .with_group(group("vssgp.a", "Readers", "[P]\\Readers"))
            .with_fetch_delay(Duration::from_millis(20));
        let cache = GroupCache::new();
        let resolver = GroupResolver::new(&directory, &cache, None);

        let (a, b, c) = tokio::join!(
            resolver.resolve_group("vssgp.a"),
            resolver.resolve_group("vssgp.a"),
            resolver.resolve_group("vssgp.a"),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(directory.group_fetches("vssgp.a"), 1);
    }

    #[tokio::test]
    async fn test_separate_caches_do_not_share_state() {
        let directory = MockDirectory::new().with_group(group("vssgp.a", "Readers", "[P]\\Readers"));
        let first_run = GroupCache::new();
        let second_run = GroupCache::new();

        GroupResolver::new(&directory, &first_run, None)
            .resolve_group("vssgp.a")
            .await
            .unwrap();
        GroupResolver::new(&directory, &second_run, None)
            .resolve_group("vssgp.a")
            .await
            .unwrap();

        assert_eq!(directory.group_fetches("vssgp.a"), 2);
    }
}
