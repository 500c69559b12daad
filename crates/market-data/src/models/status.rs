use serde::{Deserialize, Serialize};

use crate::provider::SourceKind;

/// Introspective view of one configured provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// Provider id (e.g., "FINNHUB")
    pub id: String,
    /// Display name (e.g., "Finnhub")
    pub name: String,
    /// Whether the provider has its credential or flag
    pub available: bool,
    pub description: String,
    /// Whether quotes come from an API or a scraped page
    pub source_kind: SourceKind,
    /// Position in the fallback order, 1 = tried first
    pub priority: usize,
    pub supports_quote: bool,
    pub supports_profile: bool,
    pub requests_per_minute: u32,
}
