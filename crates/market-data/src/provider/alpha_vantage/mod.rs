//! Alpha Vantage market data provider.
//!
//! Uses the `GLOBAL_QUOTE` function for latest quotes and `OVERVIEW` for
//! company profiles. Alpha Vantage reports most failures with HTTP 200 and a
//! `Note`, `Information` or `Error Message` field in the body.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, Quote, Symbol};
use crate::provider::{http_client, MarketDataProvider, ProviderCapabilities, RateLimit, SourceKind};

pub const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Alpha Vantage market data provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// API Response Structures
// ============================================================================

/// Fields every Alpha Vantage body may carry instead of data.
#[derive(Debug, Default, Deserialize)]
struct ApiNotice {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(flatten)]
    notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompanyOverviewResponse {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "OfficialSite")]
    official_site: Option<String>,
    #[serde(rename = "FullTimeEmployees")]
    full_time_employees: Option<String>,
    #[serde(flatten)]
    notice: ApiNotice,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a provider whose query endpoint is `base_url`.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })
    }

    fn check_api_error(notice: &ApiNotice, symbol: &Symbol) -> Result<(), MarketDataError> {
        if let Some(ref msg) = notice.error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound {
                    provider: PROVIDER_ID.to_string(),
                    symbol: symbol.to_string(),
                });
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        // Quota bodies arrive as either "Note" or "Information"
        for msg in [&notice.note, &notice.information].into_iter().flatten() {
            let lower = msg.to_lowercase();
            if lower.contains("api call frequency") || lower.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage notice: {}", msg);
        }

        Ok(())
    }

    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s.trim()).ok()
    }

    fn parse_quote(symbol: &Symbol, text: &str) -> Result<Quote, MarketDataError> {
        let response: GlobalQuoteResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            })?;

        Self::check_api_error(&response.notice, symbol)?;

        let not_found = || MarketDataError::SymbolNotFound {
            provider: PROVIDER_ID.to_string(),
            symbol: symbol.to_string(),
        };

        // Unknown symbols come back as `"Global Quote": {}`
        let data = response.global_quote.ok_or_else(not_found)?;
        let price = data
            .price
            .as_deref()
            .and_then(Self::parse_decimal)
            .ok_or_else(not_found)?;

        let timestamp = data
            .latest_trading_day
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        let mut quote = Quote::new(symbol.clone(), price, timestamp, PROVIDER_ID);

        let change = data.change.as_deref().and_then(Self::parse_decimal);
        let change_percent = data
            .change_percent
            .as_deref()
            .and_then(|p| Self::parse_decimal(p.trim_end_matches('%')));
        if let (Some(change), Some(change_percent)) = (change, change_percent) {
            quote = quote.with_change(change, change_percent);
        }

        if let Some(volume) = data.volume.as_deref().and_then(|v| v.trim().parse::<u64>().ok()) {
            quote = quote.with_volume(volume);
        }

        Ok(quote)
    }

    fn parse_profile(symbol: &Symbol, text: &str) -> Result<CompanyProfile, MarketDataError> {
        let response: CompanyOverviewResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse overview response: {}", e),
            })?;

        Self::check_api_error(&response.notice, symbol)?;

        // Empty object for unknown symbols
        let name = response
            .name
            .filter(|n| !n.trim().is_empty() && n != "None")
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                provider: PROVIDER_ID.to_string(),
                symbol: symbol.to_string(),
            })?;

        // Alpha Vantage uses the literal "None" for missing values
        let clean = |v: Option<String>| v.filter(|s| s != "None");

        Ok(CompanyProfile::new(symbol.clone(), name, PROVIDER_ID)
            .sector(clean(response.sector))
            .industry(clean(response.industry))
            .description(clean(response.description))
            .website(clean(response.official_site))
            .employee_count(
                response
                    .full_time_employees
                    .and_then(|n| n.trim().parse::<u64>().ok()),
            ))
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Alpha Vantage"
    }

    fn description(&self) -> &'static str {
        "Alpha Vantage API (requires ALPHA_VANTAGE_API_KEY)"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            source_kind: SourceKind::Api,
            supports_quote: true,
            supports_profile: true,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        // Free tier: 5 requests per minute
        RateLimit {
            requests_per_minute: 5,
            max_concurrency: 1,
        }
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        let text = self
            .fetch(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol.as_str())])
            .await?;
        Self::parse_quote(symbol, &text)
    }

    async fn get_profile(&self, symbol: &Symbol) -> Result<CompanyProfile, MarketDataError> {
        let text = self
            .fetch(&[("function", "OVERVIEW"), ("symbol", symbol.as_str())])
            .await?;
        Self::parse_profile(symbol, &text)
    }
}
