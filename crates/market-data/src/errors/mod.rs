//! Error types for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`NotAvailable`]: The recoverable per-adapter failure signal
//! - [`ConfigError`]: Startup configuration errors

mod not_available;

pub use not_available::{NotAvailable, NotAvailableReason};

use thiserror::Error;

use crate::registry::FetchDiagnostics;

/// Errors that can occur during market data operations.
///
/// Provider implementations return the detailed variants (`SymbolNotFound`,
/// `RateLimited`, ...). The adapter layer folds all of them into
/// [`NotAvailable`], and the aggregator surfaces `AllSourcesFailed` once every
/// adapter has declined a symbol.
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    /// The symbol is not 1-5 ASCII letters.
    #[error("Invalid symbol: '{0}'")]
    InvalidSymbol(String),

    /// More symbols were requested in one batch than the configured cap.
    #[error("Batch too large: {requested} symbols requested, at most {max} allowed")]
    BatchTooLarge {
        /// Number of symbols in the request
        requested: usize,
        /// Configured batch cap
        max: usize,
    },

    /// The provider does not know the symbol.
    #[error("Symbol not found: {symbol} ({provider})")]
    SymbolNotFound {
        /// The provider that reported the miss
        provider: String,
        /// The requested symbol
        symbol: String,
    },

    /// The provider rate limited the request (HTTP 429 or quota message).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (transport, HTTP status, bad JSON).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A scraped page no longer contains the element we extract.
    #[error("Markup not found: {provider} - {selector}")]
    MarkupNotFound {
        /// The scraping provider
        provider: String,
        /// The CSS selector that matched nothing
        selector: String,
    },

    /// The provider does not implement the operation.
    #[error("Operation '{operation}' not supported by provider: {provider}")]
    NotSupported {
        /// The operation that was attempted
        operation: String,
        /// The provider that doesn't support it
        provider: String,
    },

    /// Every configured provider declined the symbol.
    #[error("All sources failed for {symbol}: {}", diagnostics.summary())]
    AllSourcesFailed {
        /// The requested symbol
        symbol: String,
        /// Which providers were tried and why each one declined
        diagnostics: FetchDiagnostics,
    },
}

impl MarketDataError {
    /// Whether this error was raised by input validation, before any I/O.
    ///
    /// ```
    /// use tradewatch_market_data::errors::MarketDataError;
    ///
    /// assert!(MarketDataError::InvalidSymbol("BRK.B".to_string()).is_input_error());
    /// assert!(!MarketDataError::Timeout { provider: "YAHOO".to_string() }.is_input_error());
    /// ```
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidSymbol(_) | Self::BatchTooLarge { .. })
    }

    /// Whether every provider declined the request.
    pub fn is_all_sources_failed(&self) -> bool {
        matches!(self, Self::AllSourcesFailed { .. })
    }

    /// Map a `reqwest` transport error for `provider`.
    pub(crate) fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: format!("Request failed: {}", err),
            }
        }
    }
}

/// Errors raised while assembling configuration at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A provider id in the priority order is not known.
    #[error("Unknown provider '{0}' in provider order")]
    UnknownProvider(String),

    /// A provider id appears twice in the priority order.
    #[error("Provider '{0}' listed more than once in provider order")]
    DuplicateProvider(String),

    /// A variable could not be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Environment variable name
        key: String,
        /// Raw value
        value: String,
    },
}
