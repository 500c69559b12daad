use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tradewatch_market_data::ProviderStatus;

use crate::main_lib::AppState;

async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderStatus>> {
    Json(state.aggregator.provider_status())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/providers", get(list_providers))
}
