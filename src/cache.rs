// Cache-aside layer for read-heavy aggregate queries.
//
// The store behind the trait is swappable (an external store in a
// multi-process deployment); failures on either side of the cache always
// degrade to a miss so the primary data path never depends on it.

use async_trait::async_trait;
use lru::LruCache;
use serde::Serialize;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Key/value store seam for memoized query results.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// In-process store: LRU-bounded map with per-entry TTL.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AppResult<()> {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };
        self.entries.lock().await.put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().await.pop(key);
        Ok(())
    }
}

/// Cache-aside wrapper used by the search endpoints. Store errors are
/// logged and reported as a miss (get) or dropped (put).
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Cache key for a query: prefix plus the serialized raw parameter set,
    /// so any change in any parameter yields a distinct entry.
    pub fn key<P: Serialize>(prefix: &str, params: &P) -> AppResult<String> {
        let raw = serde_json::to_string(params)
            .map_err(|e| AppError::Internal(format!("Failed to serialize cache key: {}", e)))?;
        Ok(format!("{}:{}", prefix, raw))
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        match self.store.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache get failed for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, value: Value) {
        if let Err(e) = self.store.set(key, value, self.default_ttl).await {
            warn!("Cache set failed for {}: {}", key, e);
        }
    }
}
