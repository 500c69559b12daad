//! Per-request provider attempt tracking.

use crate::errors::{NotAvailable, NotAvailableReason};

/// Why a provider was passed over without an upstream call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No credential configured or the provider's flag is off.
    Disabled,

    /// Provider doesn't serve this kind of data.
    NotSupported,
}

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: String,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub success: bool,
}

/// Ordered record of which providers were tried for one symbol.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, provider_id: impl Into<String>, reason: SkipReason) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.into(),
            skipped: Some(reason),
            error: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, provider_id: impl Into<String>, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.into(),
            skipped: None,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: impl Into<String>) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.into(),
            skipped: None,
            error: None,
            success: true,
        });
    }

    /// Record an adapter's refusal as either a skip or an error.
    pub fn record_not_available(&mut self, not_available: &NotAvailable) {
        match &not_available.reason {
            NotAvailableReason::Disabled => {
                self.record_skip(not_available.provider.clone(), SkipReason::Disabled)
            }
            NotAvailableReason::NotSupported => {
                self.record_skip(not_available.provider.clone(), SkipReason::NotSupported)
            }
            reason => self.record_error(not_available.provider.clone(), reason.to_string()),
        }
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no providers configured".to_string();
        }

        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.provider_id)
                } else if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({:?})", a.provider_id, skip)
                } else if let Some(err) = &a.error {
                    format!("{}: ERROR ({})", a.provider_id, err)
                } else {
                    format!("{}: UNKNOWN", a.provider_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Number of providers that were actually called upstream.
    pub fn attempted(&self) -> usize {
        self.attempts.iter().filter(|a| a.skipped.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::errors::MarketDataError;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip("FINNHUB", SkipReason::Disabled);
        diag.record_error("ALPHA_VANTAGE", "Timeout".to_string());
        diag.record_success("YAHOO");

        let summary = diag.summary();
        assert_eq!(
            summary,
            "FINNHUB: SKIPPED (Disabled) -> ALPHA_VANTAGE: ERROR (Timeout) -> YAHOO: SUCCESS"
        );
    }

    #[test]
    fn test_record_not_available() {
        let mut diag = FetchDiagnostics::new();
        diag.record_not_available(&NotAvailable::disabled("FINNHUB"));
        diag.record_not_available(&NotAvailable::new(
            "YAHOO",
            NotAvailableReason::TimedOut(Duration::from_millis(500)),
        ));
        diag.record_not_available(&NotAvailable::upstream(
            "ALPHA_VANTAGE",
            MarketDataError::RateLimited {
                provider: "ALPHA_VANTAGE".to_string(),
            },
        ));

        assert_eq!(diag.attempts[0].skipped, Some(SkipReason::Disabled));
        assert_eq!(diag.attempts[1].error.as_deref(), Some("timed out after 500ms"));
        assert_eq!(diag.attempted(), 2);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FetchDiagnostics::new().summary(), "no providers configured");
    }
}
