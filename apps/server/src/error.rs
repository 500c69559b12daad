use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tradewatch_market_data::MarketDataError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    MarketData(#[from] MarketDataError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MarketData(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::MarketData(e) if e.is_all_sources_failed() => StatusCode::NOT_FOUND,
            ApiError::MarketData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tradewatch_market_data::FetchDiagnostics;

    #[test]
    fn status_mapping() {
        let invalid = ApiError::from(MarketDataError::InvalidSymbol("1".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let too_large = ApiError::from(MarketDataError::BatchTooLarge {
            requested: 11,
            max: 10,
        });
        assert_eq!(too_large.status(), StatusCode::BAD_REQUEST);

        let failed = ApiError::from(MarketDataError::AllSourcesFailed {
            symbol: "ZZZZZ".into(),
            diagnostics: FetchDiagnostics::new(),
        });
        assert_eq!(failed.status(), StatusCode::NOT_FOUND);

        let other = ApiError::from(MarketDataError::Timeout {
            provider: "YAHOO".into(),
        });
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
