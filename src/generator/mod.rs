//! Assembles Enricher context and Social Correlator signals into LLM-ready
//! prompts and turns the model's JSON draft into a storable `Article`
//! (spec.md §4.7). Grounded on the teacher's `vault/llm.rs` for the HTTP
//! client shape and `main.rs`'s component-wiring pattern for how the
//! Generator is assembled from its dependencies.

mod flavors;
mod llm;
mod prompt;

pub use flavors::{
    generate_breaking, generate_briefing, generate_category_digest, generate_new_market,
    generate_trending,
};
pub use llm::{LlmCallOutput, LlmClient, LlmUsage};
pub use prompt::LlmArticleDraft;

use anyhow::Result;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;

use tracing::warn;

use crate::config::Config;
use crate::enrichment::Enricher;
use crate::models::{Article, Category, Market, MarketEvent};
use crate::social::SocialCorrelator;
use crate::store::Store;

/// Markets-per-category sampled when correlating the whole feed against
/// tracked social posts for a briefing/trending/digest article (spec.md
/// §4.6 "not yet bound to one market" case).
const SOCIAL_CANDIDATE_TOP_N: usize = 10;

/// Errors the Generator can report back to a caller (spec.md §4.7
/// "Failure").
#[derive(Debug)]
pub enum GeneratorError {
    /// The model's response didn't parse as the fixed article-draft schema.
    /// Hard error for every flavor — no article is produced.
    LlmResponseMalformed(String),
    /// No LLM client configured. Hard failure for the event-triggered,
    /// breaking-style flavors (`breaking`, `new_market`); scheduled flavors
    /// fall back to templated copy instead (spec.md §4.7, Open Question
    /// decision recorded in DESIGN.md).
    LlmUnavailable,
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::LlmResponseMalformed(msg) => {
                write!(f, "llm response malformed: {msg}")
            }
            GeneratorError::LlmUnavailable => write!(f, "no llm client configured"),
        }
    }
}

impl std::error::Error for GeneratorError {}

pub struct Generator {
    llm: Option<LlmClient>,
    model: String,
    enricher: Enricher,
    social: Option<SocialCorrelator>,
    store: Store,
}

impl Generator {
    pub fn new(store: Store, cfg: &Config) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let llm = cfg
            .llm_api_key
            .clone()
            .map(|key| LlmClient::new(http.clone(), cfg.llm_base_url.clone(), key));

        let social = match &cfg.social_api_key {
            Some(key) => Some(SocialCorrelator::new(key, store.clone(), cfg)?),
            None => None,
        };

        Ok(Self {
            llm,
            model: cfg.llm_model.clone(),
            enricher: Enricher::new(cfg)?,
            social,
            store,
        })
    }

    async fn social_signals_for(&self, market: &Market) -> Vec<crate::models::SocialSignal> {
        match &self.social {
            Some(social) => social.signals_for_market(market).await,
            None => Vec::new(),
        }
    }

    /// Whole-feed correlation for an article not yet bound to one market —
    /// briefings, trending roundups, and category digests (spec.md §4.6
    /// second case).
    async fn whole_feed_social_signals(
        &self,
        categories: &[Category],
    ) -> Vec<crate::models::SocialSignal> {
        match &self.social {
            Some(social) => social
                .signals_whole_feed(categories, SOCIAL_CANDIDATE_TOP_N)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "whole-feed social correlation failed");
                    Vec::new()
                }),
            None => Vec::new(),
        }
    }

    /// Triggered by a `breaking_move` bus event, or a `threshold_cross` that
    /// crossed into the extreme band (`>= 0.75` or `<= 0.25`). Hard-fails
    /// when no LLM is configured.
    pub async fn on_breaking(&self, event: &MarketEvent) -> Result<Article> {
        let llm = self.llm.as_ref().ok_or(GeneratorError::LlmUnavailable)?;

        let enriched = self.enricher.enrich(&event.market.question).await;
        let signals = self.social_signals_for(&event.market).await;

        let new_article = generate_breaking(llm, &self.model, event, &enriched, &signals).await?;
        Ok(self.store.save_article(&new_article)?)
    }

    /// Triggered by a `new_market` bus event with `volume_24h >= 50_000`.
    /// Hard-fails when no LLM is configured, same as `on_breaking`.
    pub async fn on_new_market(&self, market: &Market) -> Result<Article> {
        let llm = self.llm.as_ref().ok_or(GeneratorError::LlmUnavailable)?;

        let enriched = self.enricher.enrich(&market.question).await;
        let new_article = generate_new_market(llm, &self.model, market, &enriched).await?;
        Ok(self.store.save_article(&new_article)?)
    }

    /// Distinct categories present across `markets`, in first-seen order.
    fn categories_of(markets: &[Market]) -> Vec<Category> {
        let mut seen = HashSet::new();
        markets
            .iter()
            .map(|m| m.category)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Scheduled briefing covering the supplied markets. Falls back to
    /// templated copy if no LLM is configured or the call fails.
    pub async fn run_briefing(&self, markets: &[Market]) -> Result<Article> {
        let mut new_article = generate_briefing(self.llm.as_ref(), &self.model, markets).await;
        new_article.social_signals = self
            .whole_feed_social_signals(&Self::categories_of(markets))
            .await;
        Ok(self.store.save_article(&new_article)?)
    }

    /// Scheduled trending roundup over the top-N markets by trending score.
    pub async fn run_trending(&self, markets: &[Market]) -> Result<Article> {
        let mut new_article = generate_trending(self.llm.as_ref(), &self.model, markets).await;
        new_article.social_signals = self
            .whole_feed_social_signals(&Self::categories_of(markets))
            .await;
        Ok(self.store.save_article(&new_article)?)
    }

    /// Scheduled per-category digest.
    pub async fn run_category_digest(
        &self,
        category: Category,
        markets: &[Market],
    ) -> Result<Article> {
        let mut new_article =
            generate_category_digest(self.llm.as_ref(), &self.model, category, markets).await;
        new_article.social_signals = self.whole_feed_social_signals(&[category]).await;
        Ok(self.store.save_article(&new_article)?)
    }
}
