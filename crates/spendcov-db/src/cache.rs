//! Memoization of warehouse query results.
//!
//! Entries are keyed by [`QuerySignature`] and stamped with the time they were
//! fetched. An entry older than the configured [`CacheTtl`] is dropped on the
//! next lookup of that key, and every expired entry is purged on insert.
//! Each cache holds at most `max_entries` values; when full, the oldest entry
//! is evicted. The lock is released before any warehouse round-trip.

use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

use spendcov_core::CacheTtl;
use tokio::sync::Mutex;

/// Upper bound on memoized results per query kind.
const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    BrandCatalog,
    Coverage,
    SpendRows,
}

impl QueryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::BrandCatalog => "brand_catalog",
            QueryKind::Coverage => "coverage",
            QueryKind::SpendRows => "spend_rows",
        }
    }
}

/// Identifies one parameterized query execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    pub kind: QueryKind,
    pub brand_filter: Option<String>,
}

impl QuerySignature {
    #[must_use]
    pub fn brand_catalog() -> Self {
        Self {
            kind: QueryKind::BrandCatalog,
            brand_filter: None,
        }
    }

    #[must_use]
    pub fn filtered(kind: QueryKind, brand_filter: &str) -> Self {
        Self {
            kind,
            brand_filter: Some(brand_filter.to_string()),
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct QueryCache<V> {
    ttl: CacheTtl,
    max_entries: usize,
    entries: Mutex<HashMap<QuerySignature, CacheEntry<V>>>,
}

impl<V: Clone> QueryCache<V> {
    #[must_use]
    pub fn new(ttl: CacheTtl) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// A cache that keeps at most `max_entries` values (at least one).
    fn with_capacity(ttl: CacheTtl, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &QuerySignature) -> Option<V> {
        self.get_at(key, Instant::now()).await
    }

    async fn get_at(&self, key: &QuerySignature, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) => self
                .ttl
                .is_expired(now.saturating_duration_since(entry.fetched_at)),
            None => return None,
        };

        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: QuerySignature, value: V) {
        self.insert_at(key, value, Instant::now()).await;
    }

    async fn insert_at(&self, key: QuerySignature, value: V, fetched_at: Instant) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| {
            !self
                .ttl
                .is_expired(fetched_at.saturating_duration_since(entry.fetched_at))
        });

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(query = oldest.kind.as_str(), "cache full, evicting oldest entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(key, CacheEntry { value, fetched_at });
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// Errors from `fetch` are returned as-is and nothing is cached.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: QuerySignature,
        fetch: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(query = key.kind.as_str(), filter = ?key.brand_filter, "cache hit");
            return Ok(value);
        }

        tracing::debug!(query = key.kind.as_str(), filter = ?key.brand_filter, "cache miss");
        let value = fetch().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn key(filter: &str) -> QuerySignature {
        QuerySignature::filtered(QueryKind::Coverage, filter)
    }

    #[tokio::test]
    async fn returns_value_before_ttl_elapses() {
        let cache = QueryCache::new(CacheTtl::Expires(Duration::from_secs(3600)));
        let start = Instant::now();
        cache.insert_at(key("Chipotle"), 7_i64, start).await;

        let hit = cache
            .get_at(&key("Chipotle"), start + Duration::from_secs(3599))
            .await;
        assert_eq!(hit, Some(7));
    }

    #[tokio::test]
    async fn evicts_value_after_ttl_elapses() {
        let cache = QueryCache::new(CacheTtl::Expires(Duration::from_secs(3600)));
        let start = Instant::now();
        cache.insert_at(key("Chipotle"), 7_i64, start).await;

        let miss = cache
            .get_at(&key("Chipotle"), start + Duration::from_secs(3600))
            .await;
        assert_eq!(miss, None);
        assert!(cache.is_empty().await, "expired entry should be removed");
    }

    #[tokio::test]
    async fn never_ttl_keeps_entries() {
        let cache = QueryCache::new(CacheTtl::Never);
        let start = Instant::now();
        cache.insert_at(key("Chipotle"), 7_i64, start).await;

        let hit = cache
            .get_at(&key("Chipotle"), start + Duration::from_secs(86_400 * 365))
            .await;
        assert_eq!(hit, Some(7));
    }

    #[tokio::test]
    async fn signatures_distinguish_filter_and_kind() {
        let cache = QueryCache::new(CacheTtl::Never);
        cache.insert(key("McDonald's"), 1_i64).await;
        cache
            .insert(QuerySignature::filtered(QueryKind::SpendRows, "McDonald's"), 2)
            .await;

        assert_eq!(cache.get(&key("McDonald's")).await, Some(1));
        assert_eq!(cache.get(&key("McDonald")).await, None);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn get_or_try_insert_with_fetches_once() {
        let cache = QueryCache::new(CacheTtl::Never);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<i64, ()> = cache
                .get_or_try_insert_with(key("Chipotle"), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value, Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_or_try_insert_with_does_not_cache_errors() {
        let cache: QueryCache<i64> = QueryCache::new(CacheTtl::Never);

        let failed: Result<i64, &str> = cache
            .get_or_try_insert_with(key("Chipotle"), || async { Err("connection refused") })
            .await;
        assert_eq!(failed, Err("connection refused"));
        assert!(cache.is_empty().await);

        let recovered: Result<i64, &str> = cache
            .get_or_try_insert_with(key("Chipotle"), || async { Ok(5) })
            .await;
        assert_eq!(recovered, Ok(5));
    }

    #[tokio::test]
    async fn insert_purges_every_expired_entry() {
        let cache = QueryCache::new(CacheTtl::Expires(Duration::from_secs(3600)));
        let start = Instant::now();
        for i in 0..1000 {
            let signature = QuerySignature::filtered(QueryKind::SpendRows, &format!("brand-{i}"));
            cache.insert_at(signature, i, start).await;
        }
        assert_eq!(cache.len().await, 1000);

        let later = start + Duration::from_secs(7200);
        assert_eq!(cache.get_at(&key("missing"), later).await, None);
        assert_eq!(cache.len().await, 1000, "lookup of another key purges nothing");
        cache.insert_at(key("fresh"), 1, later).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn insert_keeps_entries_younger_than_ttl() {
        let cache = QueryCache::new(CacheTtl::Expires(Duration::from_secs(3600)));
        let start = Instant::now();
        cache.insert_at(key("old"), 1_i64, start).await;
        cache.insert_at(key("young"), 2, start + Duration::from_secs(3000)).await;
        cache.insert_at(key("new"), 3, start + Duration::from_secs(3600)).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(
            cache.get_at(&key("young"), start + Duration::from_secs(3600)).await,
            Some(2)
        );
    }

    #[tokio::test]
    async fn never_ttl_is_bounded_by_capacity() {
        let cache = QueryCache::with_capacity(CacheTtl::Never, 3);
        let start = Instant::now();
        for (i, filter) in ["a", "b", "c", "d"].into_iter().enumerate() {
            let offset = Duration::from_secs(u64::try_from(i).expect("small index"));
            cache.insert_at(key(filter), i, start + offset).await;
        }

        assert_eq!(cache.len().await, 3);
        assert_eq!(cache.get(&key("a")).await, None, "oldest entry is evicted");
        assert_eq!(cache.get(&key("d")).await, Some(3));
    }

    #[tokio::test]
    async fn replacing_a_key_at_capacity_evicts_nothing() {
        let cache = QueryCache::with_capacity(CacheTtl::Never, 2);
        cache.insert(key("a"), 1_i64).await;
        cache.insert(key("b"), 2).await;
        cache.insert(key("a"), 3).await;

        assert_eq!(cache.get(&key("a")).await, Some(3));
        assert_eq!(cache.get(&key("b")).await, Some(2));
    }
}
