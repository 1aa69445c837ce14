use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, MarketRef, SocialSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleType {
    Breaking,
    Briefing,
    Trending,
    NewMarket,
    DeepDive,
    Digest,
    Explainer,
}

impl ArticleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::Breaking => "breaking",
            ArticleType::Briefing => "briefing",
            ArticleType::Trending => "trending",
            ArticleType::NewMarket => "new_market",
            ArticleType::DeepDive => "deep_dive",
            ArticleType::Digest => "digest",
            ArticleType::Explainer => "explainer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Low,
    Medium,
    High,
    Breaking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// The structured four-section body every article carries (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleBody {
    pub what_happened: String,
    pub why_it_matters: String,
    pub context: Vec<String>,
    pub what_to_watch: String,
    pub analysis: Option<String>,
}

/// The generated editorial artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub article_type: ArticleType,
    pub category: Category,

    pub headline: String,
    pub subheadline: String,
    pub summary: String,
    pub body: ArticleBody,

    pub primary_market: MarketRef,
    pub markets: Vec<MarketRef>,
    pub social_signals: Vec<SocialSignal>,

    pub tags: Vec<String>,
    pub significance: Significance,
    pub sentiment: Sentiment,
    pub enrichment_sources: Vec<String>,
    pub views: i64,
    pub published: bool,
    pub featured: bool,

    pub created_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
}

/// Fields the Generator assembles before handing off to the Store; the
/// store assigns `id`, timestamps, and checks slug uniqueness.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub slug: String,
    pub article_type: ArticleType,
    pub category: Category,
    pub headline: String,
    pub subheadline: String,
    pub summary: String,
    pub body: ArticleBody,
    pub primary_market: MarketRef,
    pub markets: Vec<MarketRef>,
    pub social_signals: Vec<SocialSignal>,
    pub tags: Vec<String>,
    pub significance: Significance,
    pub sentiment: Sentiment,
    pub enrichment_sources: Vec<String>,
    pub published: bool,
}
