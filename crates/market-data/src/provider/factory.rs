//! Construction of providers and adapters from configuration.

use std::sync::Arc;

use log::info;

use crate::cache::QuoteCache;
use crate::config::{MarketDataConfig, ProviderConfig, ProviderKind};

use super::alpha_vantage::{self, AlphaVantageProvider};
use super::finnhub::{self, FinnhubProvider};
use super::google_finance::{self, GoogleFinanceProvider};
use super::yahoo::{self, YahooProvider};
use super::{MarketDataProvider, ProviderAdapter};

/// Build the provider for one configuration entry.
///
/// Providers without a credential are still built (with an empty key) so that
/// provider status can list them; their adapter is disabled and never calls out.
pub fn build_provider(
    config: &ProviderConfig,
    scrape_exchanges: &[String],
) -> Arc<dyn MarketDataProvider> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let base_url = config.base_url.as_deref();

    match config.kind {
        ProviderKind::Finnhub => Arc::new(FinnhubProvider::with_base_url(
            api_key,
            base_url.unwrap_or(finnhub::BASE_URL),
        )),
        ProviderKind::AlphaVantage => Arc::new(AlphaVantageProvider::with_base_url(
            api_key,
            base_url.unwrap_or(alpha_vantage::BASE_URL),
        )),
        ProviderKind::Yahoo => Arc::new(YahooProvider::with_base_url(
            base_url.unwrap_or(yahoo::BASE_URL),
        )),
        ProviderKind::GoogleFinance => Arc::new(GoogleFinanceProvider::with_base_url(
            base_url.unwrap_or(google_finance::BASE_URL),
            scrape_exchanges.to_vec(),
        )),
    }
}

/// One adapter per configured provider, in priority order, sharing `cache`.
pub fn build_adapters(config: &MarketDataConfig, cache: Arc<dyn QuoteCache>) -> Vec<ProviderAdapter> {
    let adapters: Vec<ProviderAdapter> = config
        .providers
        .iter()
        .map(|provider_config| {
            ProviderAdapter::new(
                build_provider(provider_config, &config.scrape_exchanges),
                cache.clone(),
                provider_config.clone(),
            )
        })
        .collect();

    info!(
        "Market data providers (priority order): [{}], enabled: [{}]",
        adapters.iter().map(|a| a.id()).collect::<Vec<_>>().join(", "),
        config.enabled_provider_ids().join(", ")
    );

    adapters
}
