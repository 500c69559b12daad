use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::MarketDataError;

/// Why an adapter could not produce a value.
#[derive(Clone, Debug)]
pub enum NotAvailableReason {
    /// No credential configured or the provider's flag is off.
    Disabled,

    /// The provider does not offer this kind of data (e.g. profiles).
    NotSupported,

    /// The provider call did not finish within the configured timeout.
    TimedOut(Duration),

    /// The provider answered with an error, a malformed body, or unexpected markup.
    Upstream(MarketDataError),
}

impl fmt::Display for NotAvailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::NotSupported => write!(f, "not supported"),
            Self::TimedOut(after) => write!(f, "timed out after {}ms", after.as_millis()),
            Self::Upstream(err) => write!(f, "{}", err),
        }
    }
}

/// Recoverable per-adapter failure.
///
/// Adapters never surface anything else to the aggregator; it always means
/// "try the next provider".
#[derive(Error, Clone, Debug)]
#[error("{provider} not available: {reason}")]
pub struct NotAvailable {
    /// Provider that declined
    pub provider: String,
    /// Why it declined
    pub reason: NotAvailableReason,
}

impl NotAvailable {
    pub fn new(provider: impl Into<String>, reason: NotAvailableReason) -> Self {
        Self {
            provider: provider.into(),
            reason,
        }
    }

    pub fn disabled(provider: impl Into<String>) -> Self {
        Self::new(provider, NotAvailableReason::Disabled)
    }

    pub fn upstream(provider: impl Into<String>, err: MarketDataError) -> Self {
        Self::new(provider, NotAvailableReason::Upstream(err))
    }

    /// True when the adapter declined without calling its upstream.
    pub fn is_skip(&self) -> bool {
        matches!(
            self.reason,
            NotAvailableReason::Disabled | NotAvailableReason::NotSupported
        )
    }
}
