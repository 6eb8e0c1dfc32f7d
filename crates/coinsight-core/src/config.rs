//! Dashboard configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `COINSIGHT_QUOTE_SOURCE` | `coingecko` |
//! | `COINSIGHT_SERIES_SOURCE` | `coingecko` |
//! | `CRYPTO_PANIC_API_KEY` | unset, news degrades |
//! | `COINSIGHT_GENERATOR_URL` | `http://127.0.0.1:8080` |
//! | `COINSIGHT_GENERATOR_API_KEY` | unset |
//! | `COINSIGHT_QUOTE_TTL_SECS` | 3600 |
//! | `COINSIGHT_SERIES_TTL_SECS` | 3600 |
//! | `COINSIGHT_NEWS_LIMIT` | 5 |
//! | `COINSIGHT_PROMPT_CHAR_BUDGET` | 6000 |
//! | `COINSIGHT_TIMEOUT_MS` | 10000 |
//! | `COINSIGHT_MAX_RETRIES` | 2 |

use std::str::FromStr;
use std::time::Duration;

use crate::generator::DEFAULT_GENERATOR_URL;
use crate::http_client::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::insight::DEFAULT_PROMPT_CHAR_BUDGET;
use crate::news::DEFAULT_NEWS_LIMIT;
use crate::{ProviderId, ValidationError};

/// Quotes are cached for an hour, matching the upstream free-tier refresh.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_SERIES_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub quote_source: ProviderId,
    pub series_source: ProviderId,
    pub cryptopanic_token: Option<String>,
    pub generator_url: String,
    pub generator_api_key: Option<String>,
    pub quote_ttl: Duration,
    pub series_ttl: Duration,
    pub news_limit: usize,
    pub prompt_char_budget: usize,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            quote_source: ProviderId::Coingecko,
            series_source: ProviderId::Coingecko,
            cryptopanic_token: None,
            generator_url: String::from(DEFAULT_GENERATOR_URL),
            generator_api_key: None,
            quote_ttl: DEFAULT_QUOTE_TTL,
            series_ttl: DEFAULT_SERIES_TTL,
            news_limit: DEFAULT_NEWS_LIMIT,
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl std::fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("quote_source", &self.quote_source)
            .field("series_source", &self.series_source)
            .field("cryptopanic_token", &self.cryptopanic_token.as_ref().map(|_| "[REDACTED]"))
            .field("generator_url", &self.generator_url)
            .field("generator_api_key", &self.generator_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("quote_ttl", &self.quote_ttl)
            .field("series_ttl", &self.series_ttl)
            .field("news_limit", &self.news_limit)
            .field("prompt_char_budget", &self.prompt_char_budget)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl DashboardConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] for any set but malformed value.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            quote_source: parse_or("COINSIGHT_QUOTE_SOURCE", get("COINSIGHT_QUOTE_SOURCE"), defaults.quote_source)?,
            series_source: parse_or("COINSIGHT_SERIES_SOURCE", get("COINSIGHT_SERIES_SOURCE"), defaults.series_source)?,
            cryptopanic_token: get("CRYPTO_PANIC_API_KEY"),
            generator_url: get("COINSIGHT_GENERATOR_URL").unwrap_or(defaults.generator_url),
            generator_api_key: get("COINSIGHT_GENERATOR_API_KEY"),
            quote_ttl: parse_or("COINSIGHT_QUOTE_TTL_SECS", get("COINSIGHT_QUOTE_TTL_SECS"), defaults.quote_ttl.as_secs())
                .map(Duration::from_secs)?,
            series_ttl: parse_or("COINSIGHT_SERIES_TTL_SECS", get("COINSIGHT_SERIES_TTL_SECS"), defaults.series_ttl.as_secs())
                .map(Duration::from_secs)?,
            news_limit: parse_or("COINSIGHT_NEWS_LIMIT", get("COINSIGHT_NEWS_LIMIT"), defaults.news_limit)?,
            prompt_char_budget: parse_or(
                "COINSIGHT_PROMPT_CHAR_BUDGET",
                get("COINSIGHT_PROMPT_CHAR_BUDGET"),
                defaults.prompt_char_budget,
            )?,
            request_timeout_ms: parse_or("COINSIGHT_TIMEOUT_MS", get("COINSIGHT_TIMEOUT_MS"), defaults.request_timeout_ms)?,
            max_retries: parse_or("COINSIGHT_MAX_RETRIES", get("COINSIGHT_MAX_RETRIES"), defaults.max_retries)?,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ValidationError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidConfig { key, value: raw }),
    }
}
