use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::ScrapedPage;

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    urls: &'a [String],
    contents: ScrapeRequestContents,
}

#[derive(Debug, Serialize)]
struct ScrapeRequestContents {
    markdown: bool,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    results: Vec<ScrapeResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResultEntry {
    url: String,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Applied only to the top K URLs news search already surfaced (spec.md
/// §4.5). Runs sequentially after the parallel news/semantic fan-out.
pub struct ScrapeProvider {
    http: Client,
    api_key: String,
    char_cap: usize,
}

impl ScrapeProvider {
    pub fn new(api_key: String, char_cap: usize) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("building scrape provider client")?;
        Ok(Self {
            http,
            api_key,
            char_cap,
        })
    }

    pub async fn scrape(&self, urls: &[String]) -> Result<Vec<ScrapedPage>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let body = ScrapeRequest {
            urls,
            contents: ScrapeRequestContents { markdown: true },
        };

        let response = self
            .http
            .post("https://api.exa.ai/contents")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("deep scrape request failed")?
            .error_for_status()
            .context("deep scrape status")?;

        let parsed: ScrapeResponse = response.json().await.context("deep scrape parse")?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| {
                let markdown = r.markdown.or(r.text).unwrap_or_default();
                let markdown = if markdown.chars().count() > self.char_cap {
                    markdown.chars().take(self.char_cap).collect()
                } else {
                    markdown
                };
                ScrapedPage {
                    url: r.url,
                    markdown,
                }
            })
            .collect())
    }
}
