//! Read-through cache for tax file responses, keyed by (user_id, tax_year).
//!
//! Cache failures never fail a request: every implementation degrades to a
//! miss and logs. Selection between the Redis and no-op implementations
//! happens once at startup from configuration.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::dtos::TaxFileResponse;

const CACHE_PREFIX: &str = "taxfile:";

fn cache_key(user_id: &str, tax_year: i32) -> String {
    format!("{}{}:{}", CACHE_PREFIX, user_id, tax_year)
}

#[async_trait]
pub trait TaxFileCache: Send + Sync {
    async fn get(&self, user_id: &str, tax_year: i32) -> Option<TaxFileResponse>;
    async fn put(&self, user_id: &str, tax_year: i32, response: &TaxFileResponse);
    async fn evict(&self, user_id: &str, tax_year: i32);
    async fn evict_user(&self, user_id: &str);
}

/// Redis-backed cache with a fixed TTL per entry.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCache {
    pub fn new(manager: ConnectionManager, ttl_seconds: u64) -> Self {
        Self {
            manager,
            ttl_seconds,
        }
    }
}

#[async_trait]
impl TaxFileCache for RedisCache {
    async fn get(&self, user_id: &str, tax_year: i32) -> Option<TaxFileResponse> {
        let mut conn = self.manager.clone();
        let key = cache_key(user_id, tax_year);

        let cached: Option<String> = match redis::cmd("GET").arg(&key).query_async(&mut conn).await
        {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key = %key, "Cache read failed: {}", e);
                return None;
            }
        };

        match cached {
            Some(json) => match serde_json::from_str(&json) {
                Ok(response) => {
                    tracing::debug!(user_id = user_id, tax_year = tax_year, "Cache hit");
                    Some(response)
                }
                Err(e) => {
                    tracing::error!(key = %key, "Unreadable cached tax file: {}", e);
                    None
                }
            },
            None => {
                tracing::debug!(user_id = user_id, tax_year = tax_year, "Cache miss");
                None
            }
        }
    }

    async fn put(&self, user_id: &str, tax_year: i32, response: &TaxFileResponse) {
        let json = match serde_json::to_string(response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize tax file for cache: {}", e);
                return;
            }
        };

        let mut conn = self.manager.clone();
        let key = cache_key(user_id, tax_year);
        let result: Result<(), _> = redis::cmd("SET")
            .arg(&key)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => tracing::debug!(user_id = user_id, tax_year = tax_year, "Cached tax file"),
            Err(e) => tracing::error!(key = %key, "Cache write failed: {}", e),
        }
    }

    async fn evict(&self, user_id: &str, tax_year: i32) {
        let mut conn = self.manager.clone();
        let key = cache_key(user_id, tax_year);
        let result: Result<(), _> = redis::cmd("DEL").arg(&key).query_async(&mut conn).await;

        match result {
            Ok(()) => {
                tracing::debug!(user_id = user_id, tax_year = tax_year, "Evicted tax file")
            }
            Err(e) => tracing::error!(key = %key, "Cache eviction failed: {}", e),
        }
    }

    async fn evict_user(&self, user_id: &str) {
        let mut conn = self.manager.clone();
        let pattern = format!("{}{}:*", CACHE_PREFIX, user_id);

        let keys: Vec<String> = match redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
        {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(pattern = %pattern, "Cache key scan failed: {}", e);
                return;
            }
        };

        if keys.is_empty() {
            return;
        }

        let result: Result<(), _> = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await;
        match result {
            Ok(()) => tracing::debug!(user_id = user_id, "Evicted all tax files for user"),
            Err(e) => tracing::error!(user_id = user_id, "Cache eviction failed: {}", e),
        }
    }
}

/// No-op cache used when caching is disabled.
pub struct NoOpCache;

#[async_trait]
impl TaxFileCache for NoOpCache {
    async fn get(&self, user_id: &str, tax_year: i32) -> Option<TaxFileResponse> {
        tracing::debug!(
            user_id = user_id,
            tax_year = tax_year,
            "No-op cache: miss"
        );
        None
    }

    async fn put(&self, user_id: &str, tax_year: i32, _response: &TaxFileResponse) {
        tracing::debug!(
            user_id = user_id,
            tax_year = tax_year,
            "No-op cache: skipping put"
        );
    }

    async fn evict(&self, user_id: &str, tax_year: i32) {
        tracing::debug!(
            user_id = user_id,
            tax_year = tax_year,
            "No-op cache: skipping eviction"
        );
    }

    async fn evict_user(&self, user_id: &str) {
        tracing::debug!(user_id = user_id, "No-op cache: skipping eviction");
    }
}

/// In-memory cache for tests.
pub struct MemoryCache {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TaxFileCache for MemoryCache {
    async fn get(&self, user_id: &str, tax_year: i32) -> Option<TaxFileResponse> {
        let json = self
            .entries
            .lock()
            .ok()?
            .get(&cache_key(user_id, tax_year))
            .cloned()?;
        serde_json::from_str(&json).ok()
    }

    async fn put(&self, user_id: &str, tax_year: i32, response: &TaxFileResponse) {
        if let (Ok(json), Ok(mut entries)) = (serde_json::to_string(response), self.entries.lock())
        {
            entries.insert(cache_key(user_id, tax_year), json);
        }
    }

    async fn evict(&self, user_id: &str, tax_year: i32) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&cache_key(user_id, tax_year));
        }
    }

    async fn evict_user(&self, user_id: &str) {
        let prefix = format!("{}{}:", CACHE_PREFIX, user_id);
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(&prefix));
        }
    }
}
