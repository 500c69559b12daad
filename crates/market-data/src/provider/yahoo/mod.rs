//! Yahoo Finance market data provider.
//!
//! Free, unauthenticated source of latest quotes via the chart endpoint.
//! Gated by the `TW_YAHOO_ENABLED` flag rather than a credential.

mod models;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{header, Client};
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{Quote, Symbol};
use crate::provider::{
    http_client, to_decimal, MarketDataProvider, ProviderCapabilities, RateLimit, SourceKind,
};

use models::{YahooChartMeta, YahooChartResponse};

pub const BASE_URL: &str = "https://query1.finance.yahoo.com";
const PROVIDER_ID: &str = "YAHOO";

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chart(&self, symbol: &Symbol) -> Result<YahooChartResponse, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!("Yahoo chart request: {}", url);

        let response = self
            .client
            .get(&url)
            .header(
                header::USER_AGENT,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Unknown symbols come back as 404 with a `chart.error` body
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse chart response: {}", e),
            })
    }

    fn chart_to_quote(symbol: &Symbol, data: YahooChartResponse) -> Result<Quote, MarketDataError> {
        let not_found = || MarketDataError::SymbolNotFound {
            provider: PROVIDER_ID.to_string(),
            symbol: symbol.to_string(),
        };

        if let Some(error) = data.chart.error {
            debug!(
                "Yahoo chart error for {}: {} {}",
                symbol,
                error.code.unwrap_or_default(),
                error.description.unwrap_or_default()
            );
            return Err(not_found());
        }

        let meta: YahooChartMeta = data
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(not_found)?;

        let price = meta.regular_market_price.ok_or_else(not_found)?;

        let timestamp = meta
            .regular_market_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        let mut quote = Quote::new(
            symbol.clone(),
            to_decimal(PROVIDER_ID, "price", price)?,
            timestamp,
            PROVIDER_ID,
        );

        if let Some(prev) = meta.chart_previous_close.or(meta.previous_close) {
            quote = quote.with_previous_close(to_decimal(PROVIDER_ID, "previous close", prev)?);
        }

        Ok(quote.with_volume(meta.regular_market_volume.unwrap_or(0)))
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Yahoo Finance"
    }

    fn description(&self) -> &'static str {
        "Yahoo Finance chart API (free, no key)"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            source_kind: SourceKind::Api,
            supports_quote: true,
            supports_profile: false,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 2000,
            max_concurrency: 10,
        }
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        let data = self.fetch_chart(symbol).await?;
        Self::chart_to_quote(symbol, data)
    }
}
