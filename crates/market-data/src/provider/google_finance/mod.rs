//! Google Finance quote page scraper.
//!
//! Last-resort source. The page has no published contract, so extraction is
//! best-effort over hand-identified elements and any layout change surfaces as
//! [`MarketDataError::MarkupNotFound`]. Gated by `TW_SCRAPING_ENABLED`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{Quote, Symbol};
use crate::provider::{http_client, MarketDataProvider, ProviderCapabilities, RateLimit, SourceKind};

pub const BASE_URL: &str = "https://www.google.com";
const PROVIDER_ID: &str = "GOOGLE_FINANCE";

const PRICE_SELECTOR: &str = "div.YMlKec.fxKbKc";
const ROW_SELECTOR: &str = "div.gyFHrc";
const ROW_LABEL_SELECTOR: &str = "div.mfs7Fc";
const ROW_VALUE_SELECTOR: &str = "div.P6K39c";

/// Values extracted from one quote page.
#[derive(Debug, PartialEq)]
struct ScrapedQuote {
    price: Decimal,
    previous_close: Option<Decimal>,
    market_cap: Option<u64>,
}

/// Google Finance scraping provider.
pub struct GoogleFinanceProvider {
    client: Client,
    base_url: String,
    exchanges: Vec<String>,
}

impl GoogleFinanceProvider {
    /// `exchanges` are tried in order as the `SYMBOL:EXCHANGE` page suffix.
    pub fn new(exchanges: Vec<String>) -> Self {
        Self::with_base_url(BASE_URL, exchanges)
    }

    pub fn with_base_url(base_url: impl Into<String>, exchanges: Vec<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            exchanges,
        }
    }

    async fn fetch_page(&self, symbol: &Symbol, exchange: &str) -> Result<String, MarketDataError> {
        let url = format!("{}/finance/quote/{}:{}", self.base_url, symbol, exchange);
        debug!("Google Finance request: {}", url);

        let response = self
            .client
            .get(&url)
            .header(
                header::USER_AGENT,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )
            .query(&[("hl", "en")])
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound {
                provider: PROVIDER_ID.to_string(),
                symbol: symbol.to_string(),
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
                message: format!("Failed to read page: {}", e),
            })
    }

    fn extract(html: &str) -> Result<ScrapedQuote, MarketDataError> {
        let document = Html::parse_document(html);

        let price_text = document
            .select(&selector(PRICE_SELECTOR)?)
            .next()
            .map(element_text)
            .ok_or_else(|| markup_not_found(PRICE_SELECTOR))?;
        let price = parse_price(&price_text).ok_or_else(|| markup_not_found(PRICE_SELECTOR))?;

        let label_selector = selector(ROW_LABEL_SELECTOR)?;
        let value_selector = selector(ROW_VALUE_SELECTOR)?;

        let mut previous_close = None;
        let mut market_cap = None;
        for row in document.select(&selector(ROW_SELECTOR)?) {
            let label = row.select(&label_selector).next().map(element_text);
            let value = row.select(&value_selector).next().map(element_text);
            let (Some(label), Some(value)) = (label, value) else {
                continue;
            };

            match label.to_lowercase().as_str() {
                "previous close" => previous_close = parse_price(&value),
                "market cap" => market_cap = parse_market_cap(&value),
                _ => {}
            }
        }

        Ok(ScrapedQuote {
            price,
            previous_close,
            market_cap,
        })
    }
}

fn selector(css: &str) -> Result<Selector, MarketDataError> {
    Selector::parse(css).map_err(|e| MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message: format!("Invalid selector '{}': {}", css, e),
    })
}

fn markup_not_found(css: &str) -> MarketDataError {
    MarketDataError::MarkupNotFound {
        provider: PROVIDER_ID.to_string(),
        selector: css.to_string(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse a displayed price such as `$1,234.56`.
fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// Parse a market cap such as `2.95T USD` into a whole number.
fn parse_market_cap(text: &str) -> Option<u64> {
    let number = text.split_whitespace().next()?;
    let (digits, multiplier) = match number.chars().last()? {
        'K' => (&number[..number.len() - 1], Decimal::from(1_000u64)),
        'M' => (&number[..number.len() - 1], Decimal::from(1_000_000u64)),
        'B' => (&number[..number.len() - 1], Decimal::from(1_000_000_000u64)),
        'T' => (&number[..number.len() - 1], Decimal::from(1_000_000_000_000u64)),
        _ => (number, Decimal::ONE),
    };
    let value = Decimal::from_str(&digits.replace(',', "")).ok()?;
    value.checked_mul(multiplier)?.trunc().to_u64()
}

#[async_trait]
impl MarketDataProvider for GoogleFinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Google Finance"
    }

    fn description(&self) -> &'static str {
        "Google Finance quote page scraping (best effort)"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            source_kind: SourceKind::Scrape,
            supports_quote: true,
            supports_profile: false,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            max_concurrency: 2,
        }
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        let mut last_error = MarketDataError::SymbolNotFound {
            provider: PROVIDER_ID.to_string(),
            symbol: symbol.to_string(),
        };

        for exchange in &self.exchanges {
            let scraped = match self.fetch_page(symbol, exchange).await {
                Ok(html) => Self::extract(&html),
                Err(e) => Err(e),
            };

            match scraped {
                Ok(scraped) => {
                    let mut quote = Quote::new(symbol.clone(), scraped.price, Utc::now(), PROVIDER_ID)
                        .with_market_cap(scraped.market_cap);
                    if let Some(prev) = scraped.previous_close {
                        quote = quote.with_previous_close(prev);
                    }
                    return Ok(quote);
                }
                Err(e @ MarketDataError::RateLimited { .. }) => return Err(e),
                Err(e) => {
                    debug!("Google Finance {}:{} failed: {}", symbol, exchange, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
          <div class="YMlKec fxKbKc">$189.84</div>
          <div class="gyFHrc"><div class="mfs7Fc">Previous close</div><div class="P6K39c">$188.59</div></div>
          <div class="gyFHrc"><div class="mfs7Fc">Day range</div><div class="P6K39c">$187.00 - $190.12</div></div>
          <div class="gyFHrc"><div class="mfs7Fc">Market cap</div><div class="P6K39c">2.95T USD</div></div>
        </body></html>
    "#;

    #[test]
    fn test_extract() {
        let scraped = GoogleFinanceProvider::extract(PAGE).unwrap();
        assert_eq!(scraped.price, dec!(189.84));
        assert_eq!(scraped.previous_close, Some(dec!(188.59)));
        assert_eq!(scraped.market_cap, Some(2_950_000_000_000));
    }

    #[test]
    fn test_extract_without_price_is_markup_not_found() {
        let err = GoogleFinanceProvider::extract("<html><body><p>Consent</p></body></html>").unwrap_err();
        assert!(
            matches!(err, MarketDataError::MarkupNotFound { ref selector, .. } if selector == PRICE_SELECTOR)
        );
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_price("$1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_market_cap("512.3M USD"), Some(512_300_000));
        assert_eq!(parse_market_cap("1,200"), Some(1_200));
        assert_eq!(parse_market_cap(""), None);
    }

    #[tokio::test]
    async fn test_falls_through_exchanges() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/quote/AAPL:NASDAQ"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/finance/quote/AAPL:NYSE"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleFinanceProvider::with_base_url(
            server.uri(),
            vec!["NASDAQ".to_string(), "NYSE".to_string()],
        );
        let quote = provider.get_quote(&Symbol::parse("AAPL").unwrap()).await.unwrap();
        assert_eq!(quote.price, dec!(189.84));
        assert_eq!(quote.change, dec!(1.25));
        assert_eq!(quote.market_cap, Some(2_950_000_000_000));
        assert_eq!(quote.source, "GOOGLE_FINANCE");
    }

    #[tokio::test]
    async fn test_all_exchanges_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let provider = GoogleFinanceProvider::with_base_url(server.uri(), vec!["NASDAQ".to_string()]);
        let err = provider
            .get_quote(&Symbol::parse("AAPL").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::MarkupNotFound { .. }));
    }
}
