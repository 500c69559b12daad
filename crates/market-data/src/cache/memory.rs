//! In-memory cache with per-entry TTL using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use moka::future::Cache;
use moka::Expiry;

use super::{QuoteCache, MAX_TTL};

/// Upper bound on live entries; least recently used entries are evicted first.
const MAX_ENTRIES: u64 = 10_000;

#[derive(Clone, Debug)]
struct CacheEntry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-local cache; expired entries are never returned and are evicted
/// by moka itself.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .expire_after(EntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).await.map(|entry| entry.value)
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) {
        if ttl.is_zero() {
            self.entries.invalidate(key).await;
            return;
        }
        if ttl > MAX_TTL {
            debug!("Clamping TTL {:?} for '{}' to {:?}", ttl, key, MAX_TTL);
        }
        let entry = CacheEntry {
            value,
            ttl: ttl.min(MAX_TTL),
        };
        self.entries.insert(key.to_string(), entry).await;
    }

    async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }
}
