//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! upstream sources implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, Quote, Symbol};

use super::capabilities::{ProviderCapabilities, RateLimit};

/// Trait for market data providers.
///
/// Implementations only know how to talk to one upstream: build the request,
/// parse its response shape and map its errors onto [`MarketDataError`].
/// Caching, timeouts, enablement and the "never fail the caller" policy live in
/// [`ProviderAdapter`](super::ProviderAdapter), which wraps every provider.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tradewatch_market_data::provider::{MarketDataProvider, ProviderCapabilities, RateLimit, SourceKind};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn name(&self) -> &'static str {
///         "My Provider"
///     }
///
///     fn description(&self) -> &'static str {
///         "Quotes from my provider"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             source_kind: SourceKind::Api,
///             supports_quote: true,
///             supports_profile: false,
///         }
///     }
///
///     // ... implement get_quote
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "FINNHUB", "ALPHA_VANTAGE", etc.
    /// Used as the quote `source`, in cache keys, and in logs.
    fn id(&self) -> &'static str;

    /// Human readable name.
    fn name(&self) -> &'static str;

    /// One-line description shown by provider status.
    fn description(&self) -> &'static str;

    /// Describes what this provider can do.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Concurrency limits for this provider.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch the latest quote for a symbol.
    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError>;

    /// Fetch the company profile for a symbol.
    ///
    /// Default implementation returns `NotSupported`.
    async fn get_profile(&self, symbol: &Symbol) -> Result<CompanyProfile, MarketDataError> {
        let _ = symbol;
        Err(MarketDataError::NotSupported {
            operation: "profile".to_string(),
            provider: self.id().to_string(),
        })
    }
}
