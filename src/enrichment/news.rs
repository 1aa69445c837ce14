use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::types::NewsResult;

/// Reputable wire-service domains the news provider is restricted to
/// (spec.md §4.5 "restricted to a curated allow-list").
const ALLOWED_DOMAINS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bloomberg.com",
    "cnbc.com",
    "bbc.com",
    "wsj.com",
    "nytimes.com",
    "theguardian.com",
    "axios.com",
    "politico.com",
];

fn is_allowed_domain(url: &str) -> bool {
    ALLOWED_DOMAINS
        .iter()
        .any(|d| url.contains(d))
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<DateTime<Utc>>,
}

pub struct NewsProvider {
    http: Client,
    api_key: String,
}

impl NewsProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building news provider client")?;
        Ok(Self { http, api_key })
    }

    pub async fn search(&self, topic: &str, limit: usize) -> Result<Vec<NewsResult>> {
        let response = self
            .http
            .get("https://newsapi.org/v2/everything")
            .query(&[
                ("q", topic),
                ("sortBy", "relevancy"),
                ("pageSize", &limit.to_string()),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .context("news search request failed")?
            .error_for_status()
            .context("news search status")?;

        let parsed: NewsApiResponse = response.json().await.context("news search parse")?;

        let results = parsed
            .articles
            .into_iter()
            .filter(|a| is_allowed_domain(&a.url))
            .enumerate()
            .map(|(i, a)| {
                let domain = a
                    .url
                    .split("//")
                    .nth(1)
                    .and_then(|rest| rest.split('/').next())
                    .unwrap_or("")
                    .to_string();
                NewsResult {
                    title: a.title,
                    url: a.url,
                    domain,
                    snippet: a.description.unwrap_or_default(),
                    score: 1.0 - (i as f64 / limit.max(1) as f64),
                    published_at: a.published_at,
                }
            })
            .take(limit)
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_domains_outside_the_allow_list() {
        assert!(is_allowed_domain("https://www.reuters.com/world/story"));
        assert!(!is_allowed_domain("https://some-blog.example.com/story"));
    }
}
