// crates/serve/src/content/cache.rs

use parking_lot::Mutex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;

/// A decoded API response as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub body: Json,
    pub total: Option<u64>,
}

/// In-memory response cache keyed by endpoint path plus the full parameter set.
///
/// Lifetime is one render cycle: the HTTP layer calls [`ResponseCache::clear`]
/// when a top-level request starts. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<Mutex<HashMap<String, Arc<CachedResponse>>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<CachedResponse>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, response: CachedResponse) -> Arc<CachedResponse> {
        let response = Arc::new(response);
        self.entries.lock().insert(key, Arc::clone(&response));
        response
    }

    #[tracing::instrument(skip_all)]
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            tracing::debug!("clearing {} cached content responses", entries.len());
        }
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
