use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tradewatch_market_data::{Aggregator, MemoryCache};

pub struct AppState {
    pub aggregator: Aggregator,
}

pub fn init_tracing() {
    let log_format = std::env::var("TW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    // One cache shared by every provider adapter
    let cache = Arc::new(MemoryCache::new());
    let aggregator = Aggregator::from_config(&config.market_data, cache);

    let enabled = config.market_data.enabled_provider_ids();
    if enabled.is_empty() {
        tracing::warn!("No market data provider is enabled; every lookup will fail");
    } else {
        tracing::info!("Enabled market data providers: {}", enabled.join(", "));
    }

    Arc::new(AppState { aggregator })
}
