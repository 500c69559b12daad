use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tradewatch_market_data::CompanyProfile;

use crate::{error::ApiResult, main_lib::AppState};

async fn get_profile(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CompanyProfile>> {
    let profile = state.aggregator.get_company_profile(&symbol).await?;
    Ok(Json(profile))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/profiles/{symbol}", get(get_profile))
}
