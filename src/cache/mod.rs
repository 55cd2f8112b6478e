use std::time::{Duration, Instant};

use http::Uri;
use moka::{future::Cache, Expiry};
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::http::response::ApiResponse;

/// A stored response plus the freshness window it was stored with.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: ApiResponse,
    pub max_age: Duration,
}

struct FreshnessExpiry;

impl Expiry<String, CacheEntry> for FreshnessExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.max_age)
    }
}

/// Shared response cache keyed by request URL. Entries expire after the
/// `max-age` their own `Cache-Control` declared; nothing is invalidated
/// explicitly.
#[derive(Clone)]
pub struct CacheGateway {
    store: Cache<String, CacheEntry>,
    pending: TaskTracker,
}

impl CacheGateway {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            store: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(FreshnessExpiry)
                .build(),
            pending: TaskTracker::new(),
        }
    }

    /// Path plus query string, verbatim. GET and HEAD share a key.
    pub fn key_for(uri: &Uri) -> String {
        uri.path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string())
    }

    pub async fn lookup(&self, key: &str) -> Option<ApiResponse> {
        let hit = self.store.get(key).await;
        match &hit {
            Some(_) => debug!("cache hit: {}", key),
            None => debug!("cache miss: {}", key),
        }
        hit.map(|entry| entry.response)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    /// Stores `response` if its headers allow it. Returns whether it was kept.
    pub async fn store(&self, key: String, response: ApiResponse) -> bool {
        let Some(max_age) = response.cache_control().and_then(freshness) else {
            debug!("not caching {}: response is not publicly cacheable", key);
            return false;
        };

        debug!(
            "cache store: {} ({} bytes, {}s)",
            key,
            response.body.len(),
            max_age.as_secs()
        );
        self.store
            .insert(key, CacheEntry { response, max_age })
            .await;
        true
    }

    /// Schedules the store in the background so the caller can return its
    /// response right away. [`CacheGateway::drain`] waits for these.
    pub fn store_deferred(&self, key: String, response: ApiResponse) {
        let gateway = self.clone();
        self.pending.spawn(async move {
            gateway.store(key, response).await;
        });
    }

    /// Stops accepting deferred stores and waits for the outstanding ones.
    pub async fn drain(&self) {
        self.pending.close();
        if !self.pending.is_empty() {
            info!("waiting for {} pending cache writes", self.pending.len());
        }
        self.pending.wait().await;
    }
}

/// Freshness window from a `Cache-Control` value. Only shared, positive
/// `max-age` (or `s-maxage`, which wins) responses qualify.
pub fn freshness(cache_control: &str) -> Option<Duration> {
    let mut max_age = None;
    let mut shared_max_age = None;

    for directive in cache_control.split(',').map(|d| d.trim().to_ascii_lowercase()) {
        match directive.split_once('=') {
            Some(("max-age", secs)) => max_age = secs.trim_matches('"').parse::<u64>().ok(),
            Some(("s-maxage", secs)) => shared_max_age = secs.trim_matches('"').parse::<u64>().ok(),
            None if directive == "no-store" || directive == "private" || directive == "no-cache" => {
                return None
            }
            _ => {}
        }
    }

    shared_max_age
        .or(max_age)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
