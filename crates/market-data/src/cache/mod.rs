//! Cache layer shared by every provider adapter.
//!
//! Values are stored as serialized JSON under provider-namespaced keys, so two
//! providers' quotes for the same symbol never collide. An entry read after
//! its TTL is a miss, indistinguishable from one that was never written.

mod memory;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::Symbol;

pub use memory::MemoryCache;

/// Longest TTL an entry is kept for; longer requests are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Get / set-with-expiry store.
///
/// Concurrent writes to the same key are last-write-wins.
#[async_trait]
pub trait QuoteCache: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` for `ttl`. A zero TTL stores nothing readable.
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration);

    /// Drops the entry for `key`, if any.
    async fn invalidate(&self, key: &str);
}

/// What a cache entry holds; part of the key namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheKind {
    Quote,
    Profile,
}

impl CacheKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Profile => "profile",
        }
    }

    /// Builds the `{kind}:{PROVIDER}:{SYMBOL}` key.
    pub fn key(self, provider_id: &str, symbol: &Symbol) -> String {
        format!("{}:{}:{}", self.prefix(), provider_id, symbol)
    }
}
