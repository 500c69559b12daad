//! Scripted providers shared by the registry tests.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use crate::cache::MemoryCache;
use crate::config::{ProviderConfig, ProviderKind};
use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, Quote, Symbol};
use crate::provider::{MarketDataProvider, ProviderAdapter, ProviderCapabilities, SourceKind};

/// Provider answering only for a fixed set of symbols and counting calls.
pub(crate) struct MockProvider {
    id: &'static str,
    known: Vec<&'static str>,
    fail_all: bool,
    profiles: bool,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn knowing(id: &'static str, known: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            id,
            known: known.to_vec(),
            fail_all: false,
            profiles: false,
            delay: None,
            call_count: AtomicUsize::new(0),
        })
    }

    pub(crate) fn failing(id: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id,
            known: Vec::new(),
            fail_all: true,
            profiles: false,
            delay: None,
            call_count: AtomicUsize::new(0),
        })
    }

    pub(crate) fn with_profiles(self: Arc<Self>) -> Arc<Self> {
        let mut this = Arc::try_unwrap(self).unwrap_or_else(|_| panic!("provider already shared"));
        this.profiles = true;
        Arc::new(this)
    }

    pub(crate) fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        let mut this = Arc::try_unwrap(self).unwrap_or_else(|_| panic!("provider already shared"));
        this.delay = Some(delay);
        Arc::new(this)
    }

    pub(crate) fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    async fn check(&self, symbol: &Symbol) -> Result<(), MarketDataError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(MarketDataError::ProviderError {
                provider: self.id.to_string(),
                message: "Mock failure".to_string(),
            });
        }
        if !self.known.contains(&symbol.as_str()) {
            return Err(MarketDataError::SymbolNotFound {
                provider: self.id.to_string(),
                symbol: symbol.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn description(&self) -> &'static str {
        "Scripted test provider"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            source_kind: SourceKind::Api,
            supports_quote: true,
            supports_profile: self.profiles,
        }
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        self.check(symbol).await?;
        let timestamp = Utc.timestamp_opt(1_704_067_200, 0).unwrap();
        Ok(Quote::new(symbol.clone(), dec!(102), timestamp, self.id)
            .with_previous_close(dec!(100))
            .with_volume(1_000))
    }

    async fn get_profile(&self, symbol: &Symbol) -> Result<CompanyProfile, MarketDataError> {
        self.check(symbol).await?;
        Ok(CompanyProfile::new(
            symbol.clone(),
            format!("{} Inc", symbol),
            self.id,
        ))
    }
}

/// Wrap `provider` in an adapter configured for the provider kind of the same id.
pub(crate) fn adapter(
    provider: Arc<MockProvider>,
    enabled: bool,
    cache: Arc<MemoryCache>,
) -> ProviderAdapter {
    let kind = ProviderKind::from_str(provider.id()).unwrap();
    let mut config = ProviderConfig::new(kind);
    config.enabled = enabled;
    adapter_with(provider, config, cache)
}

pub(crate) fn adapter_with(
    provider: Arc<MockProvider>,
    config: ProviderConfig,
    cache: Arc<MemoryCache>,
) -> ProviderAdapter {
    ProviderAdapter::new(provider, cache, config)
}
