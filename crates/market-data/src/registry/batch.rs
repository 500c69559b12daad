//! Concurrent multi-symbol quote fetching.

use futures::future::join_all;
use log::debug;

use super::Aggregator;
use crate::errors::MarketDataError;
use crate::models::{BatchQuote, Symbol};

impl Aggregator {
    /// Quotes for several symbols at once.
    ///
    /// The whole request is rejected before any provider is called when it
    /// holds more than `batch_limit` symbols or any malformed symbol. Otherwise
    /// every symbol runs the full fallback concurrently and the result has the
    /// same length and order as `symbols`; one symbol failing never affects
    /// another.
    pub async fn get_quotes<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> Result<Vec<BatchQuote>, MarketDataError> {
        if symbols.len() > self.batch_limit {
            return Err(MarketDataError::BatchTooLarge {
                requested: symbols.len(),
                max: self.batch_limit,
            });
        }

        let parsed = symbols
            .iter()
            .map(|s| Symbol::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if parsed.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(parsed.iter().map(|symbol| self.quote_for(symbol))).await;

        let batch: Vec<BatchQuote> = parsed
            .into_iter()
            .zip(results)
            .map(|(symbol, result)| BatchQuote { symbol, result })
            .collect();

        debug!(
            "Batch of {} symbols: {} ok",
            batch.len(),
            batch.iter().filter(|q| q.is_ok()).count()
        );

        Ok(batch)
    }
}
