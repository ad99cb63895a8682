use std::time::Duration;

use axum::http::HeaderMap;
use bytes::Bytes;
use moka::future::Cache;

const MAX_CACHED_PAGES: u64 = 1_000;

/// Cached HTTP response.
#[derive(Clone, Debug)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// TTL-bounded store of rendered pages keyed by request identity.
#[derive(Clone)]
pub struct ResponseCache {
    pages: Cache<String, CachedResponse>,
    enabled: bool,
}

impl ResponseCache {
    /// A zero TTL disables caching.
    pub fn new(ttl: Duration) -> Self {
        let enabled = !ttl.is_zero();
        let pages = Cache::builder()
            .max_capacity(MAX_CACHED_PAGES)
            .time_to_live(if enabled { ttl } else { Duration::from_secs(1) })
            .build();

        Self { pages, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        if !self.enabled {
            return None;
        }
        self.pages.get(key).await
    }

    pub async fn insert(&self, key: String, response: CachedResponse) {
        if self.enabled {
            self.pages.insert(key, response).await;
        }
    }

    /// Drops every cached page.
    pub async fn clear(&self) {
        self.pages.invalidate_all();
        self.pages.run_pending_tasks().await;
    }

    pub async fn len(&self) -> u64 {
        self.pages.run_pending_tasks().await;
        self.pages.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
