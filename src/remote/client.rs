use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::types::{Filter, RawEvent, RawMarket, RawTrade};

const EVENTS_API_BASE: &str = "https://gamma-api.polymarket.com/events";
const MARKETS_API_BASE: &str = "https://gamma-api.polymarket.com/markets";
const TRADES_API_BASE: &str = "https://data-api.polymarket.com/trades";

const MAX_RETRIES: u32 = 3;
const BACKOFF_STEP_MS: u64 = 250;

/// A non-2xx response, carrying enough detail for the caller to decide
/// whether to treat it as recoverable (spec.md §4.1 failure model).
#[derive(Debug)]
pub struct RemoteStatusError {
    pub status: StatusCode,
    pub body: String,
}

impl std::fmt::Display for RemoteStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "remote returned {}: {}", self.status, self.body)
    }
}

impl std::error::Error for RemoteStatusError {}

/// Token-bucket-style limiter over a fixed window, same shape as the
/// teacher's `RateLimiter` in `scrapers/polymarket_api.rs`.
struct RateLimiter {
    requests_per_window: u32,
    window: Duration,
    current: u32,
    window_start: std::time::Instant,
}

impl RateLimiter {
    fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            requests_per_window,
            window,
            current: 0,
            window_start: std::time::Instant::now(),
        }
    }

    async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.current = 0;
            self.window_start = std::time::Instant::now();
        }
        if self.current >= self.requests_per_window {
            let wait = self.window - elapsed;
            if wait > Duration::ZERO {
                debug!(wait_ms = wait.as_millis() as u64, "remote rate limit wait");
                sleep(wait).await;
            }
            self.current = 0;
            self.window_start = std::time::Instant::now();
        }
        self.current += 1;
    }
}

/// Typed, rate-aware read access to the venue's event/market/trade
/// endpoints. Stateless aside from its HTTP transport; does no caching
/// (spec.md §4.1).
pub struct RemoteClient {
    http: Client,
    limiter: tokio::sync::Mutex<RateLimiter>,
}

impl RemoteClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("marketwire/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build remote HTTP client")?;

        Ok(Self {
            http,
            limiter: tokio::sync::Mutex::new(RateLimiter::new(75, Duration::from_secs(10))),
        })
    }

    pub async fn fetch_events(&self, filter: &Filter) -> Result<Vec<RawEvent>> {
        let resp = self
            .get_with_retry(EVENTS_API_BASE, &filter.to_query_pairs())
            .await?;
        let events: Vec<RawEvent> = resp.json().await.context("parsing events response")?;
        Ok(events)
    }

    pub async fn fetch_markets(&self, filter: &Filter) -> Result<Vec<RawMarket>> {
        let resp = self
            .get_with_retry(MARKETS_API_BASE, &filter.to_query_pairs())
            .await?;
        let markets: Vec<RawMarket> = resp.json().await.context("parsing markets response")?;
        Ok(markets)
    }

    pub async fn fetch_trades(&self, filter: &Filter) -> Result<Vec<RawTrade>> {
        let resp = self
            .get_with_retry(TRADES_API_BASE, &filter.to_query_pairs())
            .await?;
        let trades: Vec<RawTrade> = resp.json().await.context("parsing trades response")?;
        Ok(trades)
    }

    /// Retries on network error / timeout with **linear** backoff — `250ms,
    /// 500ms, 750ms` — not the exponential growth the rest of this codebase
    /// uses elsewhere, per the failure model this client must satisfy.
    /// Non-2xx responses fail immediately with a structured status error.
    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<reqwest::Response> {
        {
            let mut limiter = self.limiter.lock().await;
            limiter.acquire().await;
        }

        for attempt in 0..MAX_RETRIES {
            let result = self.http.get(url).query(query).send().await;

            match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(RemoteStatusError { status, body }.into());
                }
                Err(e) => {
                    warn!(url, attempt = attempt + 1, error = %e, "remote request failed");
                }
            }

            if attempt + 1 < MAX_RETRIES {
                let backoff = Duration::from_millis(BACKOFF_STEP_MS * (attempt as u64 + 1));
                sleep(backoff).await;
            }
        }

        bail!("remote request to {url} exhausted retries")
    }
}
