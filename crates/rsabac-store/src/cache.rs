//! Generic get-or-load cache with expire-after-write TTL.
//!
//! Built on Moka's future cache, which provides lock-free concurrent reads,
//! lazy TTL-based eviction, and coalescing of concurrent loads: when several
//! callers miss on the same key at once, exactly one runs the loader and all
//! of them receive its result. That coalescing is the "at most one concurrent
//! load per key" guarantee the caching store decorator relies on.

use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use moka::future::Cache;

/// A time-bounded memoizing cache.
///
/// Entries expire a fixed duration after they were written; expiry is
/// evaluated lazily on access, with no background sweep required. There is no
/// capacity bound and no explicit invalidation, matching the lifecycle of the
/// store decorator: entries are created on first miss and replaced wholesale
/// after expiry.
pub struct TtlCache<K, V> {
    inner: Cache<K, V>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose entries expire `expiry` after being written.
    pub fn new(expiry: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(expiry).build(),
        }
    }

    /// Returns the cached value for `key`, or runs `load` to produce and
    /// cache it. Concurrent callers racing on a missing key share a single
    /// execution of `load`.
    pub async fn get_or_load(&self, key: K, load: impl Future<Output = V>) -> V {
        self.inner.get_with(key, load).await
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Runs pending maintenance (evictions). Useful when testing TTL
    /// behavior.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}
