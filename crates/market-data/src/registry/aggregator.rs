//! Sequential multi-source fallback over an ordered set of adapters.
//!
//! The aggregator owns its adapters and is constructed explicitly, so several
//! independently configured aggregators can coexist (tests, multi-tenant use).

use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};

use super::FetchDiagnostics;
use crate::cache::QuoteCache;
use crate::config::{MarketDataConfig, DEFAULT_BATCH_LIMIT};
use crate::errors::{MarketDataError, NotAvailable};
use crate::models::{CompanyProfile, ProviderStatus, Quote, Symbol};
use crate::provider::{build_adapters, ProviderAdapter};

/// Multi-source quote and profile aggregator.
pub struct Aggregator {
    adapters: Vec<ProviderAdapter>,
    pub(super) batch_limit: usize,
}

impl Aggregator {
    /// Create an aggregator over `adapters`, highest priority first.
    pub fn new(adapters: Vec<ProviderAdapter>, batch_limit: usize) -> Self {
        Self {
            adapters,
            batch_limit: batch_limit.max(1),
        }
    }

    /// Build every configured provider and wrap them around a shared cache.
    pub fn from_config(config: &MarketDataConfig, cache: Arc<dyn QuoteCache>) -> Self {
        Self::new(build_adapters(config, cache), config.batch_limit)
    }

    /// Latest quote for `symbol` from the first provider able to answer.
    ///
    /// Providers are tried strictly one after another in priority order.
    /// Returns `InvalidSymbol` without any I/O for malformed input and
    /// `AllSourcesFailed` once every provider has declined.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = Symbol::parse(symbol)?;
        self.quote_for(&symbol).await
    }

    /// Company profile for `symbol`; same fallback as [`Self::get_quote`]
    /// over the profile-capable providers.
    pub async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        let symbol = Symbol::parse(symbol)?;
        self.first_available(&symbol, "profile", |adapter| adapter.fetch_profile(&symbol))
            .await
    }

    /// Every configured provider in priority order (1-based).
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.adapters
            .iter()
            .enumerate()
            .map(|(index, adapter)| adapter.status(index + 1))
            .collect()
    }

    pub(super) async fn quote_for(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        self.first_available(symbol, "quote", |adapter| adapter.fetch_quote(symbol))
            .await
    }

    async fn first_available<'a, T, F, Fut>(
        &'a self,
        symbol: &Symbol,
        what: &str,
        fetch: F,
    ) -> Result<T, MarketDataError>
    where
        F: Fn(&'a ProviderAdapter) -> Fut,
        Fut: Future<Output = Result<T, NotAvailable>>,
    {
        let mut diagnostics = FetchDiagnostics::new();

        for adapter in &self.adapters {
            match fetch(adapter).await {
                Ok(value) => {
                    diagnostics.record_success(adapter.id());
                    info!("{} for {} served by {}", what, symbol, adapter.id());
                    debug!("{} attempts for {}: {}", what, symbol, diagnostics.summary());
                    return Ok(value);
                }
                Err(not_available) => {
                    debug!("{}", not_available);
                    diagnostics.record_not_available(&not_available);
                }
            }
        }

        warn!(
            "All sources failed for {} {}: {}",
            what,
            symbol,
            diagnostics.summary()
        );

        Err(MarketDataError::AllSourcesFailed {
            symbol: symbol.to_string(),
            diagnostics,
        })
    }
}

impl Default for Aggregator {
    /// An aggregator with no providers; every lookup fails.
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_BATCH_LIMIT)
    }
}
