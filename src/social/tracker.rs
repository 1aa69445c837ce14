use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

const TRACKER_API_BASE: &str = "https://api.social-signal-tracker.io/v1";
const MIN_REQUEST_SPACING: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPost {
    pub platform_id: String,
    pub handle: String,
    pub name: String,
    pub verified: bool,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

/// A tracked account as returned by `/users` or `/users/{handle}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedUser {
    pub user_id: String,
    pub handle: String,
    pub name: String,
    pub verified: bool,
}

/// An entry from `/trackings?activeOnly=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracking {
    pub user_id: String,
    pub handle: String,
    pub active: bool,
}

/// Result of `/metrics/{user_id}?type=...&startDate=...&endDate=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMetrics {
    pub user_id: String,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub points: Vec<serde_json::Value>,
}

/// Rate-limited REST client over the external social-signal tracker
/// (spec.md §4.6 "Inputs: a list of tracked accounts... plus recent posts
/// per account", spec.md §6 "Social tracker" endpoint list). Grounded on the
/// teacher's `DomeClient` in `scrapers/dome_tracker.rs`: bearer auth header,
/// single-slot last-request timer enforcing a minimum request spacing.
pub struct TrackerClient {
    http: Client,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl TrackerClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {api_key}");
        headers.insert(
            reqwest::header::AUTHORIZATION,
            auth_value.parse().context("invalid tracker API key format")?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()
            .context("failed to build tracker HTTP client")?;

        Ok(Self {
            http,
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < MIN_REQUEST_SPACING {
                sleep(MIN_REQUEST_SPACING - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Issues one GET against the tracker API, unwraps the `{success, data}`
    /// envelope every endpoint shares (spec.md §6), and fails loudly when
    /// the remote side itself reports `success: false`.
    async fn get_envelope<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        self.pace().await;

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("tracker request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("tracker request status: {url}"))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .with_context(|| format!("tracker response parse: {url}"))?;

        if !envelope.success {
            return Err(anyhow!("tracker API reported failure for {url}"));
        }

        Ok(envelope.data)
    }

    /// `GET /users` — every account the tracker knows about.
    pub async fn users(&self) -> Result<Vec<TrackedUser>> {
        self.get_envelope(&format!("{TRACKER_API_BASE}/users"), &[]).await
    }

    /// `GET /users/{handle}` — a single account's detail.
    pub async fn user(&self, handle: &str) -> Result<TrackedUser> {
        self.get_envelope(&format!("{TRACKER_API_BASE}/users/{handle}"), &[])
            .await
    }

    /// `GET /trackings?activeOnly=true` — the accounts currently tracked
    /// (spec.md §4.6 "a list of tracked accounts from an external
    /// social-signal tracker").
    pub async fn active_trackings(&self) -> Result<Vec<Tracking>> {
        self.get_envelope(&format!("{TRACKER_API_BASE}/trackings"), &[("activeOnly", "true")])
            .await
    }

    /// `GET /users/{handle}/posts?limit=N`.
    pub async fn recent_posts(&self, handle: &str, limit: usize) -> Result<Vec<TrackedPost>> {
        let limit_str = limit.to_string();
        let posts: Vec<TrackedPost> = self
            .get_envelope(
                &format!("{TRACKER_API_BASE}/users/{handle}/posts"),
                &[("limit", limit_str.as_str())],
            )
            .await?;
        debug!(handle, count = posts.len(), "fetched tracked posts");
        Ok(posts)
    }

    /// `GET /metrics/{user_id}?type=daily&startDate=...&endDate=...`.
    pub async fn metrics(
        &self,
        user_id: &str,
        metric_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<UserMetrics> {
        self.get_envelope(
            &format!("{TRACKER_API_BASE}/metrics/{user_id}"),
            &[("type", metric_type), ("startDate", start_date), ("endDate", end_date)],
        )
        .await
    }
}
