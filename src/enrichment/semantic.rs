use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::SemanticResult;

#[derive(Debug, Serialize)]
struct SemanticRequest<'a> {
    query: &'a str,
    #[serde(rename = "numResults")]
    num_results: usize,
    #[serde(rename = "startPublishedDate")]
    start_published_date: String,
    contents: SemanticRequestContents,
}

#[derive(Debug, Serialize)]
struct SemanticRequestContents {
    highlights: bool,
    summary: bool,
}

#[derive(Debug, Deserialize)]
struct SemanticResponse {
    #[serde(default)]
    results: Vec<SemanticResultEntry>,
}

#[derive(Debug, Deserialize)]
struct SemanticResultEntry {
    title: String,
    url: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    highlights: Vec<String>,
}

/// Neural-style search restricted to a trailing-days window (spec.md §4.5).
pub struct SemanticProvider {
    http: Client,
    api_key: String,
}

impl SemanticProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("building semantic provider client")?;
        Ok(Self { http, api_key })
    }

    pub async fn search(
        &self,
        query: &str,
        window_days: i64,
        limit: usize,
    ) -> Result<Vec<SemanticResult>> {
        let start = (chrono::Utc::now() - chrono::Duration::days(window_days))
            .format("%Y-%m-%d")
            .to_string();

        let body = SemanticRequest {
            query,
            num_results: limit,
            start_published_date: start,
            contents: SemanticRequestContents {
                highlights: true,
                summary: false,
            },
        };

        let response = self
            .http
            .post("https://api.exa.ai/search")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("semantic search request failed")?
            .error_for_status()
            .context("semantic search status")?;

        let parsed: SemanticResponse = response.json().await.context("semantic search parse")?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SemanticResult {
                title: r.title,
                url: r.url,
                score: r.score.unwrap_or(0.0),
                highlights: r.highlights,
            })
            .collect())
    }
}
