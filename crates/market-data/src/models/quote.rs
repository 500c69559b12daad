use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;
use crate::errors::MarketDataError;

/// Normalized stock quote.
///
/// Every provider maps its own response shape onto this struct; `source`
/// always carries the id of the provider that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: Symbol,

    /// Last traded / current price
    pub price: Decimal,

    /// Absolute change against the previous close
    pub change: Decimal,

    /// Percent change against the previous close (1.5 means 1.5%)
    pub change_percent: Decimal,

    /// Shares traded in the current session (0 when the provider omits it)
    pub volume: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<u64>,

    /// Provider timestamp of the price
    pub timestamp: DateTime<Utc>,

    /// Provider id (FINNHUB, ALPHA_VANTAGE, YAHOO, GOOGLE_FINANCE, ...)
    pub source: String,
}

impl Quote {
    /// Create a quote with no change, volume, or market cap information.
    pub fn new(
        symbol: Symbol,
        price: Decimal,
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            price,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            volume: 0,
            market_cap: None,
            timestamp,
            source: source.into(),
        }
    }

    /// Set absolute and percent change.
    pub fn with_change(mut self, change: Decimal, change_percent: Decimal) -> Self {
        self.change = change;
        self.change_percent = change_percent;
        self
    }

    /// Derive change fields from the previous close.
    ///
    /// A zero previous close leaves the percent change at zero.
    pub fn with_previous_close(self, previous_close: Decimal) -> Self {
        let change = self.price - previous_close;
        let change_percent = if previous_close.is_zero() {
            Decimal::ZERO
        } else {
            (change / previous_close * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
        };
        self.with_change(change, change_percent)
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_market_cap(mut self, market_cap: Option<u64>) -> Self {
        self.market_cap = market_cap;
        self
    }
}

/// Outcome for one symbol of a batch request.
#[derive(Clone, Debug)]
pub struct BatchQuote {
    pub symbol: Symbol,
    pub result: Result<Quote, MarketDataError>,
}

impl BatchQuote {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.result.as_ref().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn test_quote_new() {
        let quote = Quote::new(aapl(), dec!(150.25), Utc::now(), "YAHOO");
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.volume, 0);
        assert!(quote.market_cap.is_none());
        assert_eq!(quote.source, "YAHOO");
    }

    #[test]
    fn test_with_previous_close() {
        let quote =
            Quote::new(aapl(), dec!(110), Utc::now(), "YAHOO").with_previous_close(dec!(100));
        assert_eq!(quote.change, dec!(10));
        assert_eq!(quote.change_percent, dec!(10));

        let quote =
            Quote::new(aapl(), dec!(99), Utc::now(), "YAHOO").with_previous_close(dec!(150));
        assert_eq!(quote.change, dec!(-51));
        assert_eq!(quote.change_percent, dec!(-34));
    }

    #[test]
    fn test_with_previous_close_zero() {
        let quote =
            Quote::new(aapl(), dec!(5), Utc::now(), "YAHOO").with_previous_close(Decimal::ZERO);
        assert_eq!(quote.change, dec!(5));
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let quote = Quote::new(aapl(), dec!(1.5), Utc::now(), "FINNHUB")
            .with_change(dec!(0.1), dec!(7.1429))
            .with_volume(42);
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"changePercent\""));
        assert!(json.contains("\"symbol\":\"AAPL\""));
        assert!(!json.contains("marketCap"));

        let back: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
    }
}
