//! Response cache for the API client
//!
//! Raw JSON bodies keyed by endpoint path plus query string. Entries expire
//! after a TTL so live views see fresh data on every refresh tick while
//! repeated reads inside one tick hit memory.

use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on cached responses
const DEFAULT_MAX_ENTRIES: u64 = 512;

/// Shared response cache; clones share the same entries
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, Arc<Value>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cache key of a request
    pub fn key(path: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return path.to_string();
        }
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{path}?{}", query.join("&"))
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: Arc<Value>) {
        self.inner.insert(key, value).await;
    }

    /// Drop everything, e.g. on a manual refresh
    pub fn clear(&self) {
        self.inner.invalidate_all();
        tracing::debug!("Response cache cleared");
    }

    /// Approximate number of live entries
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
