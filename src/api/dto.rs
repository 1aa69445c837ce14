//! Query parameters and response envelopes for the read API. Plain structs
//! only — all of it derives straight from `Store` query contracts (spec.md
//! §4.2); no business logic lives here.

use serde::{Deserialize, Serialize};

use crate::models::{Article, Category, Market};
use crate::store::CategoryRow;

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct NewMarketsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_new_window_hours")]
    pub within_hours: i64,
}

fn default_new_window_hours() -> i64 {
    24
}

#[derive(Debug, Deserialize)]
pub struct BreakingMarketsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_breaking_theta")]
    pub theta: f64,
}

fn default_breaking_theta() -> f64 {
    0.05
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub published_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MarketsResponse {
    pub markets: Vec<Market>,
    pub count: usize,
}

impl From<Vec<Market>> for MarketsResponse {
    fn from(markets: Vec<Market>) -> Self {
        Self {
            count: markets.len(),
            markets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Article>,
    pub count: usize,
}

impl From<Vec<Article>> for ArticlesResponse {
    fn from(articles: Vec<Article>) -> Self {
        Self {
            count: articles.len(),
            articles,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryRow>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Parses a path segment into a `Category`, used by every `/.../{category}`
/// handler.
pub fn parse_category(raw: &str) -> Option<Category> {
    Category::parse(raw)
}
