use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single market's before/after state attached to a `SocialSignal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMovement {
    pub slug: String,
    pub title: String,
    pub probability_before: f64,
    pub probability_after: f64,
    pub change: f64,
    pub time_delta_secs: i64,
}

/// An attributable social-media citation correlated to one or more market
/// movements by keyword and timing (spec.md §3 "SocialSignal").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialSignal {
    pub handle: String,
    pub name: String,
    pub verified: bool,
    pub content: String,
    pub permalink: String,
    pub posted_at: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
    pub observed_impact: f64,
    pub impact_window: String,
    pub affected_markets: Vec<MarketMovement>,
}

impl SocialSignal {
    /// Post content is truncated to 280 chars at the point of excerpting
    /// (spec.md §4.6), never re-truncated here — this just enforces the
    /// invariant defensively for callers that build one by hand.
    pub fn excerpt(content: &str) -> String {
        if content.chars().count() <= 280 {
            content.to_string()
        } else {
            content.chars().take(280).collect()
        }
    }

    pub fn permalink_for(handle: &str, platform_id: &str) -> String {
        format!("https://x.com/{handle}/status/{platform_id}")
    }
}
