//! Time-based cache for the dynamic category catalog.
//!
//! The catalog (label set + classification guide) lives in the knowledge
//! store and may change between requests. This cache keeps the last
//! successful fetch for `CACHE_TTL`; on fetch failure or an empty store it
//! falls back to last-known-good, then to compiled-in defaults, and never
//! fails the classification request.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ports::{CategoryCatalog, KnowledgeStore};

/// How long a fetched catalog stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Labels used when the store has never answered successfully.
const DEFAULT_OPTIONS: [&str; 5] = ["訂單", "退貨", "物流", "付款", "其他"];

const DEFAULT_GUIDE: &str = "\
訂單: 下單、改單、取消訂單相關問題\n\
退貨: 退貨、換貨、退款申請相關問題\n\
物流: 出貨時間、配送進度、未到貨相關問題\n\
付款: 付款方式、發票、金額相關問題\n\
其他: 無法歸入以上類別的問題";

struct CachedEntry {
    catalog: CategoryCatalog,
    fetched_at: Instant,
}

/// Shared, process-wide catalog cache.
///
/// Concurrent refreshes on expiry may race; last writer wins, which is
/// acceptable because catalog content is advisory rather than
/// correctness-critical.
pub struct CategoryCatalogCache {
    store: Arc<dyn KnowledgeStore>,
    ttl: Duration,
    entry: Mutex<Option<CachedEntry>>,
}

impl CategoryCatalogCache {
    /// Creates a cache over the given store with the default TTL.
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self::with_ttl(store, CACHE_TTL)
    }

    /// Creates a cache with a custom TTL (tests, mostly).
    pub fn with_ttl(store: Arc<dyn KnowledgeStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Returns the current catalog, fetching from the store when the cached
    /// copy is missing or stale.
    pub async fn current(&self) -> CategoryCatalog {
        if let Some(fresh) = self.fresh_copy() {
            return fresh;
        }

        match self.store.fetch_categories().await {
            Ok(catalog) if !catalog.is_empty() => {
                debug!(options = catalog.options.len(), "category catalog refreshed");
                self.install(catalog.clone());
                catalog
            }
            Ok(_) => {
                warn!("category store returned an empty catalog; using fallback");
                self.stale_or_default()
            }
            Err(error) => {
                warn!(%error, "category store fetch failed; using fallback");
                self.stale_or_default()
            }
        }
    }

    /// Built-in catalog used before the store has ever answered.
    pub fn default_catalog() -> CategoryCatalog {
        CategoryCatalog::new(
            DEFAULT_OPTIONS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_GUIDE,
        )
    }

    fn fresh_copy(&self) -> Option<CategoryCatalog> {
        let guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.catalog.clone())
    }

    fn install(&self, catalog: CategoryCatalog) {
        let mut guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CachedEntry {
            catalog,
            fetched_at: Instant::now(),
        });
    }

    /// Last-known-good catalog, kept stale so the next request retries the
    /// store; defaults when there has never been a good fetch.
    fn stale_or_default(&self) -> CategoryCatalog {
        let guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .map(|entry| entry.catalog.clone())
            .unwrap_or_else(Self::default_catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryKnowledgeStore;

    fn seeded_store() -> Arc<InMemoryKnowledgeStore> {
        let store = InMemoryKnowledgeStore::new();
        store.set_catalog(
            vec!["訂單".into(), "物流".into()],
            "訂單: 下單問題\n物流: 配送問題",
        );
        Arc::new(store)
    }

    #[tokio::test]
    async fn first_call_fetches_from_store() {
        let store = seeded_store();
        let cache = CategoryCatalogCache::new(store.clone());

        let catalog = cache.current().await;

        assert_eq!(catalog.options, vec!["訂單", "物流"]);
        assert_eq!(store.catalog_fetches(), 1);
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_store() {
        let store = seeded_store();
        let cache = CategoryCatalogCache::new(store.clone());

        cache.current().await;
        cache.current().await;
        cache.current().await;

        assert_eq!(store.catalog_fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_cache_refetches() {
        let store = seeded_store();
        let cache = CategoryCatalogCache::new(store.clone());

        cache.current().await;
        tokio::time::advance(CACHE_TTL + Duration::from_secs(1)).await;
        cache.current().await;

        assert_eq!(store.catalog_fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_falls_back_to_last_known_good() {
        let store = seeded_store();
        let cache = CategoryCatalogCache::new(store.clone());

        let first = cache.current().await;
        tokio::time::advance(CACHE_TTL + Duration::from_secs(1)).await;

        store.fail_next_fetches();
        let fallback = cache.current().await;

        assert_eq!(fallback, first);
    }

    #[tokio::test]
    async fn store_failure_without_history_yields_defaults() {
        let store = Arc::new(InMemoryKnowledgeStore::new());
        store.fail_next_fetches();
        let cache = CategoryCatalogCache::new(store);

        let catalog = cache.current().await;

        assert_eq!(catalog, CategoryCatalogCache::default_catalog());
        assert!(catalog.options.contains(&"其他".to_string()));
    }

    #[tokio::test]
    async fn empty_store_is_treated_like_a_fetch_error() {
        // A store with no catalog seeded returns empty options.
        let store = Arc::new(InMemoryKnowledgeStore::new());
        let cache = CategoryCatalogCache::new(store);

        let catalog = cache.current().await;

        assert_eq!(catalog, CategoryCatalogCache::default_catalog());
    }
}
