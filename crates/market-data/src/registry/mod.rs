//! Provider orchestration.
//!
//! This module provides:
//! - [`Aggregator`]: ordered sequential fallback across provider adapters
//! - Concurrent batch fetching (`Aggregator::get_quotes`)
//! - [`FetchDiagnostics`]: which providers were tried for a symbol, and why each declined

mod aggregator;
mod batch;
mod skip_reason;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::Aggregator;
pub use skip_reason::{FetchDiagnostics, ProviderAttempt, SkipReason};
