//! Periodic fetch → diff → classify → emit → persist (spec.md §4.4), the
//! central component of the pipeline. Grounded on the teacher's `main.rs`
//! poll-loop shape (one `tokio::spawn` per cadence, each driven by its own
//! `tokio::time::interval`) and `scrapers/polymarket_api.rs::gamma_to_events`.

mod convert;
mod diff;
mod slug;
mod trending;

pub use diff::DiffConfig;
pub use slug::generate_slug;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::config::Config;
use crate::models::{Market, NewSnapshot};
use crate::remote::{Filter, RemoteClient, SortDir};
use crate::store::Store;

pub struct Syncer {
    cache: RwLock<HashMap<String, Market>>,
    store: Store,
    remote: RemoteClient,
    bus: EventBus,
    diff_cfg: DiffConfig,
    min_volume_24h: f64,
}

impl Syncer {
    pub fn new(store: Store, remote: RemoteClient, bus: EventBus, cfg: &Config) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            store,
            remote,
            bus,
            diff_cfg: DiffConfig {
                breaking_threshold: cfg.breaking_threshold,
                volume_multiplier: cfg.volume_multiplier,
            },
            min_volume_24h: cfg.min_volume_24h,
        }
    }

    /// Loads every active-and-open market from the Store into the in-memory
    /// cache. Called once on start so a process restart reproduces the same
    /// cache state (spec.md §4.4 step 1, and the "State" closing note).
    pub fn rebuild_cache_from_store(&self) -> anyhow::Result<()> {
        let markets = self.store.all_active_open()?;
        let mut cache = self.cache.write();
        cache.clear();
        for m in markets {
            cache.insert(m.market_id.clone(), m);
        }
        info!(count = cache.len(), "syncer cache rebuilt from store");
        Ok(())
    }

    pub fn cached_market(&self, market_id: &str) -> Option<Market> {
        self.cache.read().get(market_id).cloned()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Runs one sync pass: fetch top events by 24h volume, convert every
    /// embedded market, diff against the cache, emit events, upsert.
    pub async fn sync_once(&self) -> anyhow::Result<usize> {
        let filter = Filter::new()
            .active_only()
            .with_limit(100)
            .sorted_by("volume24hr", SortDir::Desc);

        let events = self.remote.fetch_events(&filter).await?;
        let mut processed = 0usize;

        for event in &events {
            for raw in &event.markets {
                let mut market = convert::convert_market(event, raw);

                if market.volume_24h < self.min_volume_24h {
                    continue;
                }

                let prior = self.cache.read().get(&market.market_id).cloned();
                market.trending_score = trending::compute_score(&market);

                let events_to_emit = diff::diff_and_update(&mut market, prior.as_ref(), &self.diff_cfg);

                self.cache
                    .write()
                    .insert(market.market_id.clone(), market.clone());

                if let Err(e) = self.store.upsert_market(&market) {
                    warn!(market_id = %market.market_id, error = %e, "failed to upsert market");
                    continue;
                }

                for evt in events_to_emit {
                    self.bus.publish(evt);
                }

                processed += 1;
            }
        }

        debug!(processed, events = events.len(), "sync pass complete");
        Ok(processed)
    }

    /// Writes a snapshot row for every market currently cached (spec.md §4.4
    /// step 4).
    pub fn snapshot_once(&self) -> anyhow::Result<usize> {
        let markets: Vec<Market> = self.cache.read().values().cloned().collect();
        let mut written = 0usize;
        for m in &markets {
            let snap = NewSnapshot {
                market_id: m.market_id.clone(),
                probability: m.probability,
                volume_24h: m.volume_24h,
                liquidity: m.volume_total,
            };
            if let Err(e) = self.store.save_snapshot(&snap) {
                warn!(market_id = %m.market_id, error = %e, "failed to save snapshot");
                continue;
            }
            written += 1;
        }
        Ok(written)
    }

    /// Deletes snapshots older than `retention` (spec.md §4.4 step 5).
    pub fn prune_snapshots(&self, retention: chrono::Duration) -> anyhow::Result<usize> {
        self.store.clean_old_snapshots(retention)
    }
}

/// Spawns the Syncer's three independent cadences: sync, snapshot, prune.
/// Mirrors the teacher's pattern of one `tokio::spawn` per poll loop in
/// `main.rs`, each with its own `tokio::time::interval`.
pub fn spawn(syncer: Arc<Syncer>, cfg: Config) {
    {
        let syncer = syncer.clone();
        let interval_dur = cfg.sync_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval_dur);
            loop {
                ticker.tick().await;
                match syncer.sync_once().await {
                    Ok(n) => debug!(markets_processed = n, "sync tick complete"),
                    Err(e) => warn!(error = %e, "sync tick failed"),
                }
            }
        });
    }

    {
        let syncer = syncer.clone();
        let interval_dur = cfg.snapshot_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval_dur);
            loop {
                ticker.tick().await;
                match syncer.snapshot_once() {
                    Ok(n) => debug!(snapshots_written = n, "snapshot tick complete"),
                    Err(e) => warn!(error = %e, "snapshot tick failed"),
                }
            }
        });
    }

    {
        let retention = cfg.snapshot_retention;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
            loop {
                ticker.tick().await;
                match syncer.prune_snapshots(retention) {
                    Ok(n) => {
                        if n > 0 {
                            info!(deleted = n, "pruned old snapshots");
                        }
                    }
                    Err(e) => warn!(error = %e, "snapshot prune failed"),
                }
            }
        });
    }
}
