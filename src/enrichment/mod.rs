//! Parallel fan-out to news search, semantic search, and a deep-scraper,
//! producing a single LLM-ready context blob (spec.md §4.5). Grounded on
//! the teacher's `signals/enrichment.rs`: a `tokio::join!` fan-out whose
//! individual futures are matched for `Ok`/`Err` so one provider's failure
//! never fails the whole enrichment pass.

mod news;
mod scrape;
mod semantic;
mod types;

pub use types::{EnrichedContext, NewsResult, ScrapedPage, SemanticResult};

use tracing::warn;

use crate::config::Config;
use news::NewsProvider;
use scrape::ScrapeProvider;
use semantic::SemanticProvider;

pub struct Enricher {
    news: Option<NewsProvider>,
    semantic: Option<SemanticProvider>,
    scrape: Option<ScrapeProvider>,
    max_deep_scrapes: usize,
    semantic_window_days: i64,
}

impl Enricher {
    /// Each provider is individually disabled when its API key is absent
    /// (spec.md §4.5).
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let news = cfg
            .news_api_key
            .clone()
            .map(NewsProvider::new)
            .transpose()?;
        let semantic = cfg
            .semantic_api_key
            .clone()
            .map(SemanticProvider::new)
            .transpose()?;
        let scrape = cfg
            .scrape_api_key
            .clone()
            .map(|key| ScrapeProvider::new(key, cfg.scrape_char_cap))
            .transpose()?;

        Ok(Self {
            news,
            semantic,
            scrape,
            max_deep_scrapes: cfg.max_deep_scrapes,
            semantic_window_days: cfg.semantic_window_days,
        })
    }

    /// Runs news and semantic search in parallel, then deep-scrapes the top
    /// K news URLs sequentially. Never fails the caller: a provider that is
    /// disabled or errors simply contributes nothing.
    pub async fn enrich(&self, topic: &str) -> EnrichedContext {
        let news_fut = async {
            match &self.news {
                Some(provider) => provider.search(topic, 10).await,
                None => Ok(Vec::new()),
            }
        };
        let semantic_fut = async {
            match &self.semantic {
                Some(provider) => provider.search(topic, self.semantic_window_days, 10).await,
                None => Ok(Vec::new()),
            }
        };

        let (news_res, semantic_res) = tokio::join!(news_fut, semantic_fut);

        let news = match news_res {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "news search failed");
                Vec::new()
            }
        };
        let semantic = match semantic_res {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "semantic search failed");
                Vec::new()
            }
        };

        let scraped = if let Some(provider) = &self.scrape {
            let urls: Vec<String> = news
                .iter()
                .take(self.max_deep_scrapes)
                .map(|r| r.url.clone())
                .collect();
            match provider.scrape(&urls).await {
                Ok(pages) => pages,
                Err(e) => {
                    warn!(error = %e, "deep scrape failed");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut sources = Vec::new();
        if !news.is_empty() {
            sources.push("tavily".to_string());
        }
        if !semantic.is_empty() {
            sources.push("semantic".to_string());
        }
        if !scraped.is_empty() {
            sources.push("scrape".to_string());
        }

        let summary = render_summary(&news, &semantic, &scraped);

        EnrichedContext {
            news,
            semantic,
            scraped,
            summary,
            sources,
        }
    }
}

/// Formats the combined context as plain text for the LLM prompt: section
/// headers, numbered entries, bounded excerpt lengths (spec.md §4.5).
fn render_summary(news: &[NewsResult], semantic: &[SemanticResult], scraped: &[ScrapedPage]) -> String {
    let mut out = String::new();

    if !news.is_empty() {
        out.push_str("NEWS\n");
        for (i, n) in news.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} ({}) — {}\n",
                i + 1,
                n.title,
                n.domain,
                excerpt(&n.snippet, 240)
            ));
        }
        out.push('\n');
    }

    if !semantic.is_empty() {
        out.push_str("SEMANTIC\n");
        for (i, s) in semantic.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, s.title));
            for h in &s.highlights {
                out.push_str(&format!("   - {}\n", excerpt(h, 200)));
            }
        }
        out.push('\n');
    }

    if !scraped.is_empty() {
        out.push_str("DEEP CONTEXT\n");
        for (i, p) in scraped.iter().enumerate() {
            out.push_str(&format!("{}. {}\n{}\n", i + 1, p.url, excerpt(&p.markdown, 1500)));
        }
    }

    out
}

fn excerpt(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
