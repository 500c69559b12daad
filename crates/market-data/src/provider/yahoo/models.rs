//! Yahoo Finance chart API response models.
//!
//! Only the `meta` block of the chart response is used; it carries the
//! regular market price, volume and previous close without the crumb/cookie
//! handshake the quoteSummary endpoint needs.

use serde::Deserialize;

/// Top-level wrapper for `/v8/finance/chart/{symbol}`
#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

#[derive(Debug, Deserialize)]
pub struct YahooChart {
    #[serde(default)]
    pub result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    pub error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    pub meta: YahooChartMeta,
    // Note: timestamp and indicators exist but intraday bars are not used
}

/// Market snapshot for the requested symbol
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub previous_close: Option<f64>,
    pub regular_market_volume: Option<u64>,
    pub regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}
