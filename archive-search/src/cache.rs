//! In-memory cache for backend responses.
//!
//! Keyed by the normalized request, so paging through results or toggling a
//! facet back and forth does not hit the backend twice within the TTL. Uses
//! [`moka`] for async-friendly caching with automatic eviction.

use std::time::Duration;

use moka::future::Cache;

use crate::engine::BackendResponse;
use crate::query::SearchRequest;

/// Maximum number of cached responses.
const MAX_CACHE_ENTRIES: u64 = 200;

/// Deterministic cache key for one backend request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Trimmed query string. Case is kept: Lucene operators and facet
    /// values are case-sensitive.
    query: String,
    page: usize,
    rows: usize,
    sort: Option<String>,
    /// Requested facet fields with their limits, sorted.
    facets: Vec<(String, usize)>,
    fields: Vec<String>,
}

impl CacheKey {
    /// Build a key from a request.
    ///
    /// The query is trimmed; facet order does not matter.
    pub fn new(request: &SearchRequest) -> Self {
        let mut facets: Vec<(String, usize)> = request
            .facets
            .iter()
            .map(|f| (f.field.clone(), f.limit))
            .collect();
        facets.sort();
        Self {
            query: request.query.trim().to_string(),
            page: request.page,
            rows: request.rows,
            sort: request.sort.clone(),
            facets,
            fields: request.fields.clone(),
        }
    }
}

/// Response cache owned by a search service. A TTL of zero disables it.
pub struct ResponseCache {
    inner: Option<Cache<CacheKey, BackendResponse>>,
}

impl ResponseCache {
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a cached response. Always `None` when disabled.
    pub async fn get(&self, key: &CacheKey) -> Option<BackendResponse> {
        match self.inner {
            Some(ref cache) => cache.get(key).await,
            None => None,
        }
    }

    pub async fn insert(&self, key: CacheKey, response: BackendResponse) {
        if let Some(ref cache) = self.inner {
            cache.insert(key, response).await;
        }
    }
}
