//! Polls tracked accounts, keyword-matches posts to markets, and produces
//! attributable social signals (spec.md §4.6). Grounded on the teacher's
//! `signals/correlator.rs` (a config-carrying correlator struct holding a
//! storage handle) and `scrapers/dome_tracker.rs` (the rate-limited REST
//! client this module's `tracker` submodule imitates).

mod correlator;
mod tracker;

pub use correlator::{build_signal, correlate_whole_feed, extract_keywords, is_relevant};
pub use tracker::{TrackedPost, TrackedUser, Tracking, TrackerClient, UserMetrics};

use anyhow::Result;
use tracing::warn;

use crate::config::Config;
use crate::models::{Market, SocialSignal};
use crate::store::Store;

pub struct SocialCorrelator {
    tracker: TrackerClient,
    store: Store,
    time_window: chrono::Duration,
    min_market_change: f64,
    max_signals_per_article: usize,
}

impl SocialCorrelator {
    pub fn new(api_key: &str, store: Store, cfg: &Config) -> Result<Self> {
        Ok(Self {
            tracker: TrackerClient::new(api_key)?,
            store,
            time_window: cfg.social_time_window,
            min_market_change: cfg.min_market_change,
            max_signals_per_article: cfg.max_signals_per_article,
        })
    }

    /// The accounts currently tracked, fetched live from the tracker API
    /// (spec.md §4.6 "a list of tracked accounts from an external
    /// social-signal tracker") rather than held as static configuration.
    async fn tracked_handles(&self) -> Vec<String> {
        match self.tracker.active_trackings().await {
            Ok(trackings) => trackings
                .into_iter()
                .filter(|t| t.active)
                .map(|t| t.handle)
                .collect(),
            Err(e) => {
                warn!(error = %e, "fetching active trackings failed");
                Vec::new()
            }
        }
    }

    async fn fetch_all_recent_posts(&self) -> Vec<TrackedPost> {
        let mut all = Vec::new();
        for handle in self.tracked_handles().await {
            match self.tracker.recent_posts(&handle, 20).await {
                Ok(posts) => all.extend(posts),
                Err(e) => warn!(handle, error = %e, "fetching tracked account posts failed"),
            }
        }
        all
    }

    /// Signals attributable specifically to one market — used when an
    /// article is already bound to a primary market (spec.md §4.6 first
    /// case).
    pub async fn signals_for_market(&self, market: &Market) -> Vec<SocialSignal> {
        let keywords = extract_keywords(&market.question);
        let posts = self.fetch_all_recent_posts().await;

        posts
            .into_iter()
            .filter(|post| is_relevant(&keywords, post, self.time_window))
            .map(|post| build_signal(&post, market, self.time_window))
            .take(self.max_signals_per_article)
            .collect()
    }

    /// Whole-feed correlation for an article not yet bound to one market:
    /// scans top-N markets per configured category (spec.md §4.6 second
    /// case).
    pub async fn signals_whole_feed(&self, categories: &[crate::models::Category], top_n: usize) -> Result<Vec<SocialSignal>> {
        let mut candidates = Vec::new();
        for category in categories {
            candidates.extend(self.store.markets_by_category(*category, top_n)?);
        }

        let posts = self.fetch_all_recent_posts().await;

        Ok(correlate_whole_feed(
            &posts,
            &candidates,
            self.time_window,
            self.min_market_change,
            self.max_signals_per_article,
        ))
    }
}
