//! TradeWatch Market Data Crate
//!
//! Multi-source stock quote and company profile aggregation.
//!
//! # Overview
//!
//! The crate fetches market data from several third-party sources, normalizes
//! it into one [`Quote`] / [`CompanyProfile`] shape, caches it per provider and
//! falls back across providers so callers get an answer whenever any source can
//! give one.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |    Aggregator    |  (priority-ordered fallback, batch fan-out)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | ProviderAdapter  | --> |   QuoteCache     |  (provider:symbol keys, TTL)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (Finnhub, Alpha Vantage, Yahoo, Google Finance)
//! +------------------+
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tradewatch_market_data::{Aggregator, MarketDataConfig, MemoryCache};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MarketDataConfig::from_env()?;
//! let aggregator = Aggregator::from_config(&config, Arc::new(MemoryCache::new()));
//!
//! let quote = aggregator.get_quote("AAPL").await?;
//! println!("{} {} from {}", quote.symbol, quote.price, quote.source);
//!
//! for item in aggregator.get_quotes(&["MSFT", "GOOG"]).await? {
//!     println!("{}: {}", item.symbol, item.is_ok());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use cache::{MemoryCache, QuoteCache};
pub use config::{MarketDataConfig, ProviderConfig, ProviderKind};
pub use errors::{ConfigError, MarketDataError, NotAvailable};
pub use models::{BatchQuote, CompanyProfile, ProviderStatus, Quote, Symbol};
pub use provider::{MarketDataProvider, ProviderAdapter};
pub use registry::{Aggregator, FetchDiagnostics};
