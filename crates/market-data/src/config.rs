//! Provider configuration assembled once at startup.
//!
//! Adapters never read the environment themselves; everything they need is
//! captured here and injected through [`Aggregator::from_config`](crate::Aggregator::from_config).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;

use crate::cache::MAX_TTL;
use crate::errors::ConfigError;

/// Default batch cap for [`Aggregator::get_quotes`](crate::Aggregator::get_quotes).
pub const DEFAULT_BATCH_LIMIT: usize = 10;

/// Default per-call provider timeout.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default profile freshness; profiles change rarely.
pub const DEFAULT_PROFILE_TTL: Duration = Duration::from_secs(3600);

/// Exchanges tried, in order, by the Google Finance scraper.
pub const DEFAULT_SCRAPE_EXCHANGES: &[&str] = &["NASDAQ", "NYSE"];

/// Upstream providers this crate knows how to talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Finnhub,
    AlphaVantage,
    Yahoo,
    GoogleFinance,
}

impl ProviderKind {
    /// Default fallback order: paid APIs, then the free API, scraping last.
    pub const DEFAULT_ORDER: [ProviderKind; 4] = [
        ProviderKind::Finnhub,
        ProviderKind::AlphaVantage,
        ProviderKind::Yahoo,
        ProviderKind::GoogleFinance,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Finnhub => "FINNHUB",
            Self::AlphaVantage => "ALPHA_VANTAGE",
            Self::Yahoo => "YAHOO",
            Self::GoogleFinance => "GOOGLE_FINANCE",
        }
    }

    /// Quote TTL used when no override is configured.
    ///
    /// Alpha Vantage's free tier allows 5 calls per minute, so its quotes are
    /// kept longer.
    pub const fn default_quote_ttl(self) -> Duration {
        match self {
            Self::Finnhub | Self::Yahoo => Duration::from_secs(60),
            Self::AlphaVantage => Duration::from_secs(300),
            Self::GoogleFinance => Duration::from_secs(120),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::DEFAULT_ORDER
            .into_iter()
            .find(|kind| kind.id() == normalized)
            .ok_or_else(|| ConfigError::UnknownProvider(s.trim().to_string()))
    }
}

/// Configuration for one provider adapter.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Derived from the presence of the credential or flag.
    pub enabled: bool,

    pub api_key: Option<String>,

    /// Overrides the provider's public endpoint (proxies, tests).
    pub base_url: Option<String>,

    pub quote_ttl: Duration,
    pub profile_ttl: Duration,

    /// Applied to every call this adapter makes upstream.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// An enabled provider with default TTLs and timeout.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            enabled: true,
            api_key: None,
            base_url: None,
            quote_ttl: kind.default_quote_ttl(),
            profile_ttl: DEFAULT_PROFILE_TTL,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

// Hand-written so API keys never reach the logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("quote_ttl", &self.quote_ttl)
            .field("profile_ttl", &self.profile_ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Complete market data configuration.
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    /// Providers in fallback priority order; first entry is tried first.
    pub providers: Vec<ProviderConfig>,

    /// Maximum number of symbols accepted by one batch request.
    pub batch_limit: usize,

    /// Exchange suffixes the Google Finance scraper tries, in order.
    pub scrape_exchanges: Vec<String>,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            scrape_exchanges: DEFAULT_SCRAPE_EXCHANGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl MarketDataConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `FINNHUB_API_KEY` / `ALPHA_VANTAGE_API_KEY` | unset, provider disabled |
    /// | `TW_YAHOO_ENABLED` | `true` |
    /// | `TW_SCRAPING_ENABLED` | `false` |
    /// | `TW_PROVIDER_ORDER` | `FINNHUB,ALPHA_VANTAGE,YAHOO,GOOGLE_FINANCE` |
    /// | `TW_<ID>_QUOTE_TTL_SECS`, `TW_<ID>_PROFILE_TTL_SECS`, `TW_<ID>_BASE_URL` | per provider |
    /// | `TW_PROVIDER_TIMEOUT_MS` | `10000` |
    /// | `TW_BATCH_LIMIT` | `10` |
    /// | `TW_SCRAPE_EXCHANGES` | `NASDAQ,NYSE` |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let order = match get("TW_PROVIDER_ORDER") {
            Some(raw) => parse_order(&raw)?,
            None => ProviderKind::DEFAULT_ORDER.to_vec(),
        };

        let timeout = match get("TW_PROVIDER_TIMEOUT_MS") {
            Some(raw) => match parse_number("TW_PROVIDER_TIMEOUT_MS", &raw)? {
                0 => {
                    return Err(ConfigError::InvalidValue {
                        key: "TW_PROVIDER_TIMEOUT_MS".to_string(),
                        value: raw,
                    })
                }
                millis => Duration::from_millis(millis),
            },
            None => DEFAULT_PROVIDER_TIMEOUT,
        };

        let yahoo_enabled = match get("TW_YAHOO_ENABLED") {
            Some(raw) => parse_flag("TW_YAHOO_ENABLED", &raw)?,
            None => true,
        };
        let scraping_enabled = match get("TW_SCRAPING_ENABLED") {
            Some(raw) => parse_flag("TW_SCRAPING_ENABLED", &raw)?,
            None => false,
        };

        let mut providers = Vec::with_capacity(order.len());
        for kind in order {
            let mut config = ProviderConfig::new(kind);
            config.timeout = timeout;

            match kind {
                ProviderKind::Finnhub => {
                    config.api_key = get("FINNHUB_API_KEY");
                    config.enabled = config.api_key.is_some();
                }
                ProviderKind::AlphaVantage => {
                    config.api_key = get("ALPHA_VANTAGE_API_KEY");
                    config.enabled = config.api_key.is_some();
                }
                ProviderKind::Yahoo => config.enabled = yahoo_enabled,
                ProviderKind::GoogleFinance => config.enabled = scraping_enabled,
            }

            let quote_ttl_key = format!("TW_{}_QUOTE_TTL_SECS", kind.id());
            if let Some(raw) = get(&quote_ttl_key) {
                config.quote_ttl = parse_ttl(&quote_ttl_key, &raw)?;
            }
            let profile_ttl_key = format!("TW_{}_PROFILE_TTL_SECS", kind.id());
            if let Some(raw) = get(&profile_ttl_key) {
                config.profile_ttl = parse_ttl(&profile_ttl_key, &raw)?;
            }
            config.base_url = get(&format!("TW_{}_BASE_URL", kind.id()));

            debug!("Configured provider: {:?}", config);
            providers.push(config);
        }

        let batch_limit = match get("TW_BATCH_LIMIT") {
            Some(raw) => {
                let limit = parse_number("TW_BATCH_LIMIT", &raw)? as usize;
                if limit == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TW_BATCH_LIMIT".to_string(),
                        value: raw,
                    });
                }
                limit
            }
            None => DEFAULT_BATCH_LIMIT,
        };

        let scrape_exchanges = match get("TW_SCRAPE_EXCHANGES") {
            Some(raw) => split_list(&raw)
                .into_iter()
                .map(|s| s.to_ascii_uppercase())
                .collect(),
            None => MarketDataConfig::default().scrape_exchanges,
        };

        Ok(Self {
            providers,
            batch_limit,
            scrape_exchanges,
        })
    }

    /// Ids of the enabled providers, in priority order.
    pub fn enabled_provider_ids(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.kind.id())
            .collect()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_order(raw: &str) -> Result<Vec<ProviderKind>, ConfigError> {
    let mut order = Vec::new();
    for id in split_list(raw) {
        let kind: ProviderKind = id.parse()?;
        if order.contains(&kind) {
            return Err(ConfigError::DuplicateProvider(kind.id().to_string()));
        }
        order.push(kind);
    }
    Ok(order)
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// TTL in seconds, at most [`MAX_TTL`].
fn parse_ttl(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let ttl = Duration::from_secs(parse_number(key, raw)?);
    if ttl > MAX_TTL {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(ttl)
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MarketDataConfig::from_lookup(|_| None).unwrap();

        let ids: Vec<_> = config.providers.iter().map(|p| p.kind.id()).collect();
        assert_eq!(ids, vec!["FINNHUB", "ALPHA_VANTAGE", "YAHOO", "GOOGLE_FINANCE"]);
        // No keys: only the free API is on, scraping is opt-in
        assert_eq!(config.enabled_provider_ids(), vec!["YAHOO"]);
        assert_eq!(config.batch_limit, 10);
        assert_eq!(config.scrape_exchanges, vec!["NASDAQ", "NYSE"]);
        assert_eq!(config.providers[1].quote_ttl, Duration::from_secs(300));
        assert_eq!(config.providers[0].profile_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_credentials_enable_providers() {
        let config = MarketDataConfig::from_lookup(lookup(&[
            ("FINNHUB_API_KEY", "fh-key"),
            ("ALPHA_VANTAGE_API_KEY", "  "),
            ("TW_SCRAPING_ENABLED", "true"),
            ("TW_YAHOO_ENABLED", "off"),
        ]))
        .unwrap();

        assert_eq!(
            config.enabled_provider_ids(),
            vec!["FINNHUB", "GOOGLE_FINANCE"]
        );
        assert_eq!(config.providers[0].api_key.as_deref(), Some("fh-key"));
    }

    #[test]
    fn test_custom_order_and_overrides() {
        let config = MarketDataConfig::from_lookup(lookup(&[
            ("TW_PROVIDER_ORDER", "yahoo, finnhub"),
            ("TW_YAHOO_QUOTE_TTL_SECS", "15"),
            ("TW_YAHOO_BASE_URL", "http://localhost:9000"),
            ("TW_PROVIDER_TIMEOUT_MS", "2500"),
            ("TW_BATCH_LIMIT", "25"),
        ]))
        .unwrap();

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].kind, ProviderKind::Yahoo);
        assert_eq!(config.providers[0].quote_ttl, Duration::from_secs(15));
        assert_eq!(
            config.providers[0].base_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.providers[1].timeout, Duration::from_millis(2500));
        assert_eq!(config.batch_limit, 25);
    }

    #[test]
    fn test_invalid_values() {
        let err = MarketDataConfig::from_lookup(lookup(&[("TW_PROVIDER_ORDER", "YAHOO,IEX")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownProvider("IEX".to_string()));

        let err =
            MarketDataConfig::from_lookup(lookup(&[("TW_PROVIDER_ORDER", "YAHOO,yahoo")]))
                .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateProvider("YAHOO".to_string()));

        let err = MarketDataConfig::from_lookup(lookup(&[("TW_BATCH_LIMIT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err =
            MarketDataConfig::from_lookup(lookup(&[("TW_YAHOO_ENABLED", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = MarketDataConfig::from_lookup(lookup(&[("TW_PROVIDER_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TW_PROVIDER_TIMEOUT_MS".to_string(),
                value: "0".to_string(),
            }
        );
    }

    #[test]
    fn test_ttl_bounds() {
        let max = u64::MAX.to_string();
        let err =
            MarketDataConfig::from_lookup(lookup(&[("TW_YAHOO_QUOTE_TTL_SECS", max.as_str())]))
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "TW_YAHOO_QUOTE_TTL_SECS"
        ));

        let one_year = MAX_TTL.as_secs().to_string();
        let config = MarketDataConfig::from_lookup(lookup(&[
            ("TW_FINNHUB_PROFILE_TTL_SECS", one_year.as_str()),
            ("TW_YAHOO_QUOTE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.providers[0].profile_ttl, MAX_TTL);
        assert_eq!(config.providers[2].quote_ttl, Duration::ZERO);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new(ProviderKind::Finnhub).with_api_key("secret-key");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("***"));
    }
}
