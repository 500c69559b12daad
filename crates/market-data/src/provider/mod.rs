//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that every upstream implements
//! - `ProviderAdapter`, the uniform cache/timeout/enablement wrapper
//! - Provider capabilities, request rate and concurrency limits
//! - Concrete providers (Finnhub, Alpha Vantage, Yahoo, Google Finance)
//! - `build_adapters`, which turns configuration into an ordered adapter list
//!
//! Providers only speak their upstream's wire format. Everything else
//! (caching, timeouts, mapping failures to "not available") happens in the
//! adapter so that all sources behave the same from the aggregator's side.

mod adapter;
mod capabilities;
mod factory;
mod throttle;
mod traits;

pub mod alpha_vantage;
pub mod finnhub;
pub mod google_finance;
pub mod yahoo;

pub use adapter::ProviderAdapter;
pub use capabilities::{ProviderCapabilities, RateLimit, SourceKind};
pub use factory::{build_adapters, build_provider};
pub use traits::MarketDataProvider;

use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;

/// Fallback client timeout; the adapter's per-call timeout is normally shorter.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client construction for all providers.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .user_agent(concat!("tradewatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Convert a JSON float into a `Decimal`, rejecting NaN/infinite values.
pub(crate) fn to_decimal(provider: &str, field: &str, value: f64) -> Result<Decimal, MarketDataError> {
    Decimal::try_from(value).map_err(|_| MarketDataError::ProviderError {
        provider: provider.to_string(),
        message: format!("Invalid {}: {}", field, value),
    })
}
