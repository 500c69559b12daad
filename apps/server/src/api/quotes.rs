use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tradewatch_market_data::{BatchQuote, Quote};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Quote>> {
    let quote = state.aggregator.get_quote(&symbol).await?;
    Ok(Json(quote))
}

#[derive(Deserialize)]
struct BatchQuery {
    /// Comma-separated symbols
    symbols: Option<String>,
}

/// One entry of a batch response; the batch itself never fails per symbol.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum BatchQuoteItem {
    Ok { symbol: String, quote: Quote },
    Unavailable { symbol: String, message: String },
}

impl From<BatchQuote> for BatchQuoteItem {
    fn from(item: BatchQuote) -> Self {
        let symbol = item.symbol.to_string();
        match item.result {
            Ok(quote) => BatchQuoteItem::Ok { symbol, quote },
            Err(e) => BatchQuoteItem::Unavailable {
                symbol,
                message: e.to_string(),
            },
        }
    }
}

async fn get_quotes(
    Query(query): Query<BatchQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BatchQuoteItem>>> {
    let raw = query
        .symbols
        .ok_or_else(|| ApiError::BadRequest("Missing 'symbols' query parameter".to_string()))?;
    let symbols: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let batch = state.aggregator.get_quotes(&symbols).await?;
    Ok(Json(batch.into_iter().map(BatchQuoteItem::from).collect()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes", get(get_quotes))
        .route("/quotes/{symbol}", get(get_quote))
}
