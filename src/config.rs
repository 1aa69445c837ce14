//! Flat environment-backed configuration, grounded on the teacher's
//! `Config::from_env` in `models.rs`: `dotenv` loads a local `.env`, every
//! field falls back to a documented default when its variable is absent or
//! unparseable.

use std::time::Duration;

use anyhow::Result;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,

    /// §4.4 Market Syncer.
    pub sync_interval: Duration,
    pub snapshot_interval: Duration,
    pub snapshot_retention: chrono::Duration,
    pub min_volume_24h: f64,
    pub breaking_threshold: f64,
    pub volume_multiplier: f64,

    /// §4.5 Enricher.
    pub news_api_key: Option<String>,
    pub semantic_api_key: Option<String>,
    pub scrape_api_key: Option<String>,
    pub max_deep_scrapes: usize,
    pub semantic_window_days: i64,
    pub scrape_char_cap: usize,

    /// §4.6 Social Correlator. The tracked-account list itself comes live
    /// from the tracker API (`/trackings?activeOnly=true`), not config.
    pub social_api_key: Option<String>,
    pub social_poll_interval: Duration,
    pub social_time_window: chrono::Duration,
    pub min_market_change: f64,
    pub max_signals_per_article: usize,

    /// §4.7 Content Generator.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,

    /// §4.8 Scheduler.
    pub briefing_hour_utc: u32,
    pub digest_weekday: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            database_path: env_string_or("DATABASE_PATH", "./marketwire.db"),
            port: env_or("PORT", 8080u16),

            sync_interval: Duration::from_secs(env_or("SYNC_INTERVAL_SECS", 30u64)),
            snapshot_interval: Duration::from_secs(env_or("SNAPSHOT_INTERVAL_SECS", 300u64)),
            snapshot_retention: chrono::Duration::days(env_or("SNAPSHOT_RETENTION_DAYS", 7i64)),
            min_volume_24h: env_or("MIN_VOLUME_24H", 10_000.0f64),
            breaking_threshold: env_or("BREAKING_THRESHOLD", 0.05f64),
            volume_multiplier: env_or("VOLUME_MULTIPLIER", 3.0f64),

            news_api_key: std::env::var("NEWS_API_KEY").ok(),
            semantic_api_key: std::env::var("SEMANTIC_API_KEY").ok(),
            scrape_api_key: std::env::var("SCRAPE_API_KEY").ok(),
            max_deep_scrapes: env_or("MAX_DEEP_SCRAPES", 3usize),
            semantic_window_days: env_or("SEMANTIC_WINDOW_DAYS", 7i64),
            scrape_char_cap: env_or("SCRAPE_CHAR_CAP", 8000usize),

            social_api_key: std::env::var("SOCIAL_API_KEY").ok(),
            social_poll_interval: Duration::from_secs(env_or("SOCIAL_POLL_INTERVAL_SECS", 120u64)),
            social_time_window: chrono::Duration::hours(env_or("SOCIAL_TIME_WINDOW_HOURS", 2i64)),
            min_market_change: env_or("MIN_MARKET_CHANGE", 0.02f64),
            max_signals_per_article: env_or("MAX_SIGNALS_PER_ARTICLE", 3usize),

            llm_api_key: std::env::var("LLM_API_KEY").ok(),
            llm_base_url: env_string_or("LLM_BASE_URL", "https://openrouter.ai/api/v1"),
            llm_model: env_string_or("LLM_MODEL", "anthropic/claude-3.5-sonnet"),

            briefing_hour_utc: env_or("BRIEFING_HOUR_UTC", 13u32),
            digest_weekday: env_or("DIGEST_WEEKDAY", 0u32),
        })
    }
}
