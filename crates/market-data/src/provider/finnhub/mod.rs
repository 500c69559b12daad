//! Finnhub market data provider implementation.
//!
//! This module provides market data from Finnhub API:
//! - Latest quotes via /quote endpoint
//! - Company profiles via /stock/profile2 endpoint
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, Quote, Symbol};
use crate::provider::{
    http_client, to_decimal, MarketDataProvider, ProviderCapabilities, RateLimit, SourceKind,
};

pub const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Change
    d: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    /// Previous close price
    pc: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
    // Note: h, l, o exist but are not part of the normalized quote
}

/// Response from /stock/profile2 endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    /// Company name
    name: Option<String>,
    /// Stock ticker
    ticker: Option<String>,
    /// Finnhub industry classification
    finnhub_industry: Option<String>,
    /// Company website
    weburl: Option<String>,
    /// Number of employees
    employee_total: Option<f64>,
    // Note: country, logo, marketCapitalization, ipo fields exist but are not mapped
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub market data provider.
///
/// Requires an API key; the adapter keeps it disabled otherwise.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a provider that talks to `base_url` instead of the public API.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, symbol: &Symbol) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} for {}", endpoint, symbol);

        let response = self
            .client
            .get(&url)
            // Header auth keeps the key out of URLs and logs
            .header("X-Finnhub-Token", &self.api_key)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        // 403 covers premium-only endpoints; its body names the problem
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(ErrorResponse { error: Some(message) }) =
                serde_json::from_str::<ErrorResponse>(&body)
            {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message,
                });
            }

            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }

    fn parse_quote(symbol: &Symbol, text: &str) -> Result<Quote, MarketDataError> {
        let response: QuoteResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            })?;

        let not_found = || MarketDataError::SymbolNotFound {
            provider: PROVIDER_ID.to_string(),
            symbol: symbol.to_string(),
        };

        let price = response.c.ok_or_else(not_found)?;

        // Finnhub answers unknown symbols with an all-zero body instead of an error
        if price == 0.0 && response.t.unwrap_or(0) == 0 {
            return Err(not_found());
        }

        let timestamp = response
            .t
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        let quote = Quote::new(
            symbol.clone(),
            to_decimal(PROVIDER_ID, "price", price)?,
            timestamp,
            PROVIDER_ID,
        );

        let quote = match (response.d, response.dp, response.pc) {
            (Some(d), Some(dp), _) => quote.with_change(
                to_decimal(PROVIDER_ID, "change", d)?,
                to_decimal(PROVIDER_ID, "percent change", dp)?,
            ),
            (_, _, Some(pc)) => quote.with_previous_close(to_decimal(PROVIDER_ID, "previous close", pc)?),
            _ => quote,
        };

        // /quote carries no volume or market cap
        Ok(quote)
    }

    fn parse_profile(symbol: &Symbol, text: &str) -> Result<CompanyProfile, MarketDataError> {
        let not_found = || MarketDataError::SymbolNotFound {
            provider: PROVIDER_ID.to_string(),
            symbol: symbol.to_string(),
        };

        // Empty object means the symbol is unknown
        if text.trim() == "{}" {
            return Err(not_found());
        }

        let response: ProfileResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse profile response: {}", e),
            })?;

        let name = response
            .name
            .filter(|n| !n.trim().is_empty())
            .or(response.ticker)
            .ok_or_else(not_found)?;

        Ok(CompanyProfile::new(symbol.clone(), name, PROVIDER_ID)
            .industry(response.finnhub_industry)
            .website(response.weburl)
            .employee_count(
                response
                    .employee_total
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map(|n| n as u64),
            ))
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Finnhub"
    }

    fn description(&self) -> &'static str {
        "Finnhub REST API (requires FINNHUB_API_KEY)"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            source_kind: SourceKind::Api,
            supports_quote: true,
            supports_profile: true,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60,
            max_concurrency: 5,
        }
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        let text = self.fetch("/quote", symbol).await?;
        Self::parse_quote(symbol, &text)
    }

    async fn get_profile(&self, symbol: &Symbol) -> Result<CompanyProfile, MarketDataError> {
        let text = self.fetch("/stock/profile2", symbol).await?;
        Self::parse_profile(symbol, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn test_provider_id() {
        let provider = FinnhubProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "FINNHUB");
    }

    #[test]
    fn test_provider_capabilities() {
        let provider = FinnhubProvider::new("test_key".to_string());
        let caps = provider.capabilities();
        assert!(caps.supports_quote);
        assert!(caps.supports_profile);
        assert_eq!(caps.source_kind, SourceKind::Api);
    }

    #[test]
    fn test_quote_response_parsing() {
        let json = r#"{"c":189.84,"d":1.25,"dp":0.6628,"h":190.5,"l":188.1,"o":188.9,"pc":188.59,"t":1704067200}"#;
        let quote = FinnhubProvider::parse_quote(&aapl(), json).unwrap();
        assert_eq!(quote.price, dec!(189.84));
        assert_eq!(quote.change, dec!(1.25));
        assert_eq!(quote.change_percent, dec!(0.6628));
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.timestamp.timestamp(), 1704067200);
        assert_eq!(quote.source, "FINNHUB");
    }

    #[test]
    fn test_quote_unknown_symbol() {
        let json = r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#;
        let err = FinnhubProvider::parse_quote(&aapl(), json).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound { .. }));
    }

    #[test]
    fn test_profile_response_parsing() {
        let json = r#"{
            "country": "US",
            "finnhubIndustry": "Technology",
            "name": "Apple Inc",
            "ticker": "AAPL",
            "weburl": "https://www.apple.com/",
            "marketCapitalization": 2900000,
            "employeeTotal": 161000
        }"#;
        let profile = FinnhubProvider::parse_profile(&aapl(), json).unwrap();
        assert_eq!(profile.name, "Apple Inc");
        assert_eq!(profile.industry.as_deref(), Some("Technology"));
        assert_eq!(profile.website.as_deref(), Some("https://www.apple.com/"));
        assert_eq!(profile.employee_count, Some(161000));
        assert_eq!(profile.source, "FINNHUB");
    }

    #[test]
    fn test_profile_empty_is_not_found() {
        let err = FinnhubProvider::parse_profile(&aapl(), "{}").unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_quote_sends_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .and(query_param("symbol", "AAPL"))
            .and(header("X-Finnhub-Token", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "c": 190.0, "d": 2.0, "dp": 1.0638, "pc": 188.0, "t": 1704067200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = FinnhubProvider::with_base_url("test_key".to_string(), server.uri());
        let quote = provider.get_quote(&aapl()).await.unwrap();
        assert_eq!(quote.price, dec!(190));
        assert_eq!(quote.change, dec!(2));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stock/profile2"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = FinnhubProvider::with_base_url("bad_key".to_string(), server.uri());

        let err = provider.get_quote(&aapl()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));

        let err = provider.get_profile(&aapl()).await.unwrap_err();
        assert!(
            matches!(err, MarketDataError::ProviderError { ref message, .. } if message == "Invalid or missing API key")
        );
    }

    #[tokio::test]
    async fn test_error_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "Internal failure" })),
            )
            .mount(&server)
            .await;

        let provider = FinnhubProvider::with_base_url("test_key".to_string(), server.uri());
        let err = provider.get_quote(&aapl()).await.unwrap_err();
        assert!(
            matches!(err, MarketDataError::ProviderError { ref message, .. } if message == "Internal failure")
        );
    }

    #[tokio::test]
    async fn test_forbidden_is_an_access_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/profile2"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": "You don't have access to this resource."
            })))
            .mount(&server)
            .await;

        let provider = FinnhubProvider::with_base_url("free_key".to_string(), server.uri());
        let err = provider.get_profile(&aapl()).await.unwrap_err();
        assert!(matches!(
            err,
            MarketDataError::ProviderError { ref message, .. }
                if message == "You don't have access to this resource."
        ));
    }
}
