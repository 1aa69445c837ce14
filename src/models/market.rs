use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// The canonical projection of a remote Polymarket market.
///
/// `slug` and `market_id` are each globally unique (spec.md §3 invariant);
/// a slug collision on distinct ids is a bug, not a recoverable condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub market_id: String,
    pub slug: String,

    pub question: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub condition_id: String,
    pub group_item_title: Option<String>,

    pub probability: f64,
    pub previous_prob: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub last_trade_price: Option<f64>,
    pub outcomes: Vec<String>,
    pub outcome_prices: Vec<f64>,

    pub volume_1h: f64,
    pub volume_24h: f64,
    pub volume_7d: f64,
    pub volume_total: f64,
    pub event_volume_24h: f64,
    pub event_volume_total: f64,

    pub active: bool,
    pub closed: bool,
    pub archived: bool,
    pub accepting_bids: bool,
    pub end_date: Option<String>,

    pub category: Category,
    pub tags: Vec<String>,
    pub polymarket_url: String,

    pub trending_score: f64,

    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Market {
    /// True once the market has cleared the "active and open" bar used for
    /// cache rehydration and most read queries.
    pub fn is_active_open(&self) -> bool {
        self.active && !self.closed && !self.archived
    }

    /// `outcome_prices[0]` is defined to equal `probability` (spec.md §3/§8).
    pub fn yes_price(&self) -> f64 {
        self.outcome_prices.first().copied().unwrap_or(self.probability)
    }
}

/// Snapshot of a `MarketRef` embedded in an article at generation time, so
/// the article stays narratively faithful even after the market moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRef {
    pub market_id: String,
    pub slug: String,
    pub question: String,
    pub probability: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
}

impl From<&Market> for MarketRef {
    fn from(m: &Market) -> Self {
        Self {
            market_id: m.market_id.clone(),
            slug: m.slug.clone(),
            question: m.question.clone(),
            probability: m.probability,
            change_24h: m.change_24h,
            volume_24h: m.volume_24h,
        }
    }
}
