//! Uniform wrapper that turns a provider into an adapter.
//!
//! Every provider, whatever its upstream, is driven through the same steps:
//! enablement check, cache lookup, request throttle, bounded and timed
//! upstream call, cache write. Every failure along the way becomes [`NotAvailable`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cache::{CacheKind, QuoteCache};
use crate::config::ProviderConfig;
use crate::errors::{MarketDataError, NotAvailable, NotAvailableReason};
use crate::models::{CompanyProfile, ProviderStatus, Quote, Symbol};

use super::throttle::Throttle;
use super::MarketDataProvider;

/// Values an adapter caches: they name their symbol and their producer.
trait Attributed: Serialize + DeserializeOwned {
    fn symbol(&self) -> &Symbol;
    fn source(&self) -> &str;
}

impl Attributed for Quote {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn source(&self) -> &str {
        &self.source
    }
}

impl Attributed for CompanyProfile {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// One configured provider plus the policies applied around it.
pub struct ProviderAdapter {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<dyn QuoteCache>,
    config: ProviderConfig,
    permits: Semaphore,
    throttle: Throttle,
}

impl ProviderAdapter {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<dyn QuoteCache>,
        config: ProviderConfig,
    ) -> Self {
        let rate_limit = provider.rate_limit();
        Self {
            permits: Semaphore::new(rate_limit.max_concurrency.max(1)),
            throttle: Throttle::new(rate_limit.requests_per_minute),
            provider,
            cache,
            config,
        }
    }

    pub fn id(&self) -> &'static str {
        self.provider.id()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Status entry for this adapter at 1-based `priority`.
    pub fn status(&self, priority: usize) -> ProviderStatus {
        let caps = self.provider.capabilities();
        ProviderStatus {
            id: self.provider.id().to_string(),
            name: self.provider.name().to_string(),
            available: self.config.enabled,
            description: self.provider.description().to_string(),
            source_kind: caps.source_kind,
            priority,
            supports_quote: caps.supports_quote,
            supports_profile: caps.supports_profile,
            requests_per_minute: self.provider.rate_limit().requests_per_minute,
        }
    }

    /// Latest quote for `symbol`, from cache when fresh.
    pub async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, NotAvailable> {
        if !self.provider.capabilities().supports_quote {
            return Err(NotAvailable::new(self.id(), NotAvailableReason::NotSupported));
        }
        self.fetch_cached(CacheKind::Quote, symbol, self.config.quote_ttl, || {
            self.provider.get_quote(symbol)
        })
        .await
    }

    /// Company profile for `symbol`, from cache when fresh.
    pub async fn fetch_profile(&self, symbol: &Symbol) -> Result<CompanyProfile, NotAvailable> {
        if !self.provider.capabilities().supports_profile {
            return Err(NotAvailable::new(self.id(), NotAvailableReason::NotSupported));
        }
        self.fetch_cached(CacheKind::Profile, symbol, self.config.profile_ttl, || {
            self.provider.get_profile(symbol)
        })
        .await
    }

    async fn fetch_cached<T, F, Fut>(
        &self,
        kind: CacheKind,
        symbol: &Symbol,
        ttl: Duration,
        call: F,
    ) -> Result<T, NotAvailable>
    where
        T: Attributed,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let provider_id = self.id();

        if !self.config.enabled {
            return Err(NotAvailable::disabled(provider_id));
        }

        let key = kind.key(provider_id, symbol);
        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!("Cache hit for '{}'", key);
                    return Ok(value);
                }
                Err(e) => warn!("Discarding unreadable cache entry '{}': {}", key, e),
            }
        }

        if !self.throttle.try_acquire() {
            debug!("Provider '{}' throttled for {}", provider_id, symbol);
            return Err(NotAvailable::upstream(
                provider_id,
                MarketDataError::RateLimited {
                    provider: provider_id.to_string(),
                },
            ));
        }

        let outcome = tokio::time::timeout(self.config.timeout, async {
            let _permit = self.permits.acquire().await.map_err(|_| {
                MarketDataError::ProviderError {
                    provider: provider_id.to_string(),
                    message: "Adapter is shut down".to_string(),
                }
            })?;
            call().await
        })
        .await;

        let value = match outcome {
            Err(_) => {
                warn!(
                    "Provider '{}' timed out after {:?} for {}",
                    provider_id, self.config.timeout, symbol
                );
                return Err(NotAvailable::new(
                    provider_id,
                    NotAvailableReason::TimedOut(self.config.timeout),
                ));
            }
            Ok(Err(e)) => {
                debug!("Provider '{}' failed for {}: {}", provider_id, symbol, e);
                return Err(NotAvailable::upstream(provider_id, e));
            }
            Ok(Ok(value)) => value,
        };

        if value.source() != provider_id || value.symbol() != symbol {
            return Err(NotAvailable::upstream(
                provider_id,
                MarketDataError::ProviderError {
                    provider: provider_id.to_string(),
                    message: format!(
                        "Mismatched result: asked {} from {}, got {} from '{}'",
                        symbol,
                        provider_id,
                        value.symbol(),
                        value.source()
                    ),
                },
            ));
        }

        match serde_json::to_string(&value) {
            Ok(raw) => self.cache.set_with_ttl(&key, raw, ttl).await,
            Err(e) => warn!("Could not cache '{}': {}", key, e),
        }

        Ok(value)
    }
}
