//! Provider capabilities and concurrency configuration.
//!
//! This module defines structures for describing what a market data provider
//! can do and how hard we may hit it.

use serde::{Deserialize, Serialize};

/// How a provider obtains its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Published JSON API
    Api,
    /// HTML page parsed with CSS selectors; best-effort fallback only
    Scrape,
}

/// Describes the capabilities of a market data provider.
///
/// Used by the aggregator to decide which adapters take part in a
/// quote or profile lookup.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    pub source_kind: SourceKind,

    /// Whether the provider serves latest quotes.
    pub supports_quote: bool,

    /// Whether the provider serves company profiles.
    pub supports_profile: bool,
}

/// Request limits for a provider.
///
/// Each adapter sizes a token bucket from `requests_per_minute` and a
/// semaphore from `max_concurrency`.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Sustained request rate allowed by the provider's plan.
    pub requests_per_minute: u32,

    /// Maximum concurrent in-flight requests to this provider.
    pub max_concurrency: usize,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            max_concurrency: 5,
        }
    }
}
