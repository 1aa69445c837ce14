use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResult {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub snippet: String,
    pub score: f64,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticResult {
    pub title: String,
    pub url: String,
    pub score: f64,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub markdown: String,
}

/// Single LLM-ready context blob produced by the Enricher (spec.md §4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichedContext {
    pub news: Vec<NewsResult>,
    pub semantic: Vec<SemanticResult>,
    pub scraped: Vec<ScrapedPage>,
    pub summary: String,
    pub sources: Vec<String>,
}
