use std::net::SocketAddr;
use std::time::Duration;

use crate::utils::errors::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://data.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";
const DEFAULT_BITCOIN_PRICE_API_URL: &str = "https://api.coindesk.com/v1/bpi/currentprice.json";
const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Application configuration derived from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Time between ingestion ticks
    pub ingest_interval: Duration,
    pub exchange_rate_api_url: String,
    pub bitcoin_price_api_url: String,
    pub news_api_url: String,
    pub news_api_key: String,
    /// Per-request timeout for every upstream call
    pub http_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let news_api_key = get("NEWS_API_KEY").ok_or(ConfigError::Missing("NEWS_API_KEY"))?;

        let bind_raw = or_default("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            database_url: or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            bind_addr,
            ingest_interval: parse_secs(get("INGEST_INTERVAL_SECS"), "INGEST_INTERVAL_SECS", 900)?,
            exchange_rate_api_url: or_default("EXCHANGE_RATE_API_URL", DEFAULT_EXCHANGE_RATE_API_URL),
            bitcoin_price_api_url: or_default("BITCOIN_PRICE_API_URL", DEFAULT_BITCOIN_PRICE_API_URL),
            news_api_url: or_default("NEWS_API_URL", DEFAULT_NEWS_API_URL),
            news_api_key,
            http_timeout: parse_secs(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 10)?,
            cache_ttl: parse_secs(get("CACHE_TTL_SECS"), "CACHE_TTL_SECS", 600)?,
        })
    }
}

/// Parse a positive number of seconds, falling back to `default` when unset
fn parse_secs(raw: Option<String>, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(Duration::from_secs(default)),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}
