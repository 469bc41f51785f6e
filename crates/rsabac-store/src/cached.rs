//! Caching decorator over any [`AttributeStore`].
//!
//! Wraps user-attribute and hierarchy lookups in TTL caches so that a burst
//! of evaluations for the same user hits the backing store at most once per
//! expiry window. Absent results are cached too: an unknown user stays
//! unknown for the full window rather than hammering the backing store.
//!
//! `users()` enumeration is deliberately not cached and always delegates to
//! the backing store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use rsabac_domain::{Attribute, AttributeValueSet, Hierarchy};

use crate::cache::TtlCache;
use crate::traits::AttributeStore;

/// An [`AttributeStore`] that memoizes another store's lookups.
///
/// Both caches share a single expiry duration. Hierarchy presence checks ride
/// the hierarchy cache via the trait's default `has_hierarchy`, so checking
/// and then fetching a hierarchy costs one backing lookup, not two.
pub struct CachedAttributeStore {
    inner: Arc<dyn AttributeStore>,
    user_cache: TtlCache<String, Option<AttributeValueSet>>,
    hierarchy_cache: TtlCache<Attribute, Option<Hierarchy>>,
}

impl CachedAttributeStore {
    /// Wraps `inner`, caching lookup results for `expiry`.
    pub fn new(inner: Arc<dyn AttributeStore>, expiry: Duration) -> Self {
        Self {
            inner,
            user_cache: TtlCache::new(expiry),
            hierarchy_cache: TtlCache::new(expiry),
        }
    }

    #[cfg(test)]
    async fn run_pending_tasks(&self) {
        self.user_cache.run_pending_tasks().await;
        self.hierarchy_cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl AttributeStore for CachedAttributeStore {
    async fn attributes(&self, user: &str) -> Option<AttributeValueSet> {
        let inner = Arc::clone(&self.inner);
        let key = user.to_string();
        self.user_cache
            .get_or_load(key.clone(), async move { inner.attributes(&key).await })
            .await
    }

    async fn get_hierarchy(&self, attribute: &Attribute) -> Option<Hierarchy> {
        let inner = Arc::clone(&self.inner);
        let key = attribute.clone();
        self.hierarchy_cache
            .get_or_load(key.clone(), async move { inner.get_hierarchy(&key).await })
            .await
    }

    async fn users(&self) -> HashSet<String> {
        self.inner.users().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Backing store that counts how many lookups reach it.
    #[derive(Default)]
    struct CountingStore {
        attribute_calls: AtomicUsize,
        hierarchy_calls: AtomicUsize,
        users_calls: AtomicUsize,
        empty_hierarchy: bool,
    }

    #[async_trait]
    impl AttributeStore for CountingStore {
        async fn attributes(&self, user: &str) -> Option<AttributeValueSet> {
            self.attribute_calls.fetch_add(1, Ordering::SeqCst);
            if user == "employee1" {
                Some(AttributeValueSet::parse("credentials=hnd, employee").unwrap())
            } else {
                None
            }
        }

        async fn get_hierarchy(&self, attribute: &Attribute) -> Option<Hierarchy> {
            self.hierarchy_calls.fetch_add(1, Ordering::SeqCst);
            if attribute.name() == "credentials" {
                let tiers: Vec<String> = if self.empty_hierarchy {
                    Vec::new()
                } else {
                    vec!["hnc".into(), "hnd".into(), "phd".into()]
                };
                Some(Hierarchy::new(attribute.clone(), tiers))
            } else {
                None
            }
        }

        async fn users(&self) -> HashSet<String> {
            self.users_calls.fetch_add(1, Ordering::SeqCst);
            HashSet::from(["employee1".to_string()])
        }
    }

    fn cached(expiry: Duration) -> (Arc<CountingStore>, CachedAttributeStore) {
        let inner = Arc::new(CountingStore::default());
        let store = CachedAttributeStore::new(Arc::clone(&inner) as Arc<dyn AttributeStore>, expiry);
        (inner, store)
    }

    #[tokio::test]
    async fn repeated_user_lookups_hit_backing_store_once() {
        let (inner, store) = cached(Duration::from_secs(60));
        for _ in 0..5 {
            let attrs = store.attributes("employee1").await.unwrap();
            assert!(attrs.contains(&Attribute::new("employee"), "true"));
        }
        assert_eq!(inner.attribute_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_cached_as_absent() {
        let (inner, store) = cached(Duration::from_secs(60));
        for _ in 0..5 {
            assert!(store.attributes("nobody").await.is_none());
        }
        assert_eq!(inner.attribute_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiry_triggers_reload() {
        let (inner, store) = cached(Duration::from_millis(50));
        store.attributes("employee1").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.run_pending_tasks().await;
        store.attributes("employee1").await;
        assert_eq!(inner.attribute_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn hierarchy_presence_rides_the_hierarchy_cache() {
        let (inner, store) = cached(Duration::from_secs(60));
        let credentials = Attribute::new("credentials");
        assert!(store.has_hierarchy(&credentials).await);
        let hierarchy = store.get_hierarchy(&credentials).await.unwrap();
        assert_eq!(hierarchy.tiers().len(), 3);
        assert_eq!(inner.hierarchy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_hierarchy_has_no_presence() {
        let inner = Arc::new(CountingStore {
            empty_hierarchy: true,
            ..CountingStore::default()
        });
        let store =
            CachedAttributeStore::new(Arc::clone(&inner) as Arc<dyn AttributeStore>, Duration::from_secs(60));
        let credentials = Attribute::new("credentials");
        assert!(!store.has_hierarchy(&credentials).await);
        assert!(store.get_hierarchy(&credentials).await.is_some());
        assert_eq!(inner.hierarchy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_hierarchy_is_cached_as_absent() {
        let (inner, store) = cached(Duration::from_secs(60));
        let clearance = Attribute::new("clearance");
        for _ in 0..4 {
            assert!(!store.has_hierarchy(&clearance).await);
        }
        assert_eq!(inner.hierarchy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn user_enumeration_bypasses_the_cache() {
        let (inner, store) = cached(Duration::from_secs(60));
        for _ in 0..3 {
            assert!(store.users().await.contains("employee1"));
        }
        assert_eq!(inner.users_calls.load(Ordering::SeqCst), 3);
    }
}
