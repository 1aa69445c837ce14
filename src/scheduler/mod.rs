//! Two independent long-running loops — a minute-granularity job ticker and
//! an Event Bus consumer — coexisting the same way the teacher's `main.rs`
//! runs its websocket and REST poll loops side by side (spec.md §4.8).

mod job;

pub use job::{default_jobs, Job, JobKind, Schedule};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::config::Config;
use crate::generator::Generator;
use crate::models::{EventKind, MarketEvent};
use crate::store::Store;

const JOB_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const NEW_MARKET_VOLUME_FLOOR: f64 = 50_000.0;
const BREAKING_CROSS_HIGH: f64 = 0.75;
const BREAKING_CROSS_LOW: f64 = 0.25;
const TOP_N_FOR_ROUNDUP: usize = 10;

pub struct Scheduler {
    jobs: RwLock<Vec<Job>>,
    generator: Arc<Generator>,
    store: Store,
    bus: EventBus,
}

impl Scheduler {
    pub fn new(generator: Arc<Generator>, store: Store, bus: EventBus, cfg: &Config) -> Self {
        Self {
            jobs: RwLock::new(default_jobs(cfg, Utc::now())),
            generator,
            store,
            bus,
        }
    }

    fn due_job_indices(&self, now: chrono::DateTime<Utc>) -> Vec<usize> {
        self.jobs
            .read()
            .iter()
            .enumerate()
            .filter(|(_, j)| j.next_run <= now)
            .map(|(i, _)| i)
            .collect()
    }

    async fn dispatch(generator: &Generator, store: &Store, kind: JobKind) -> anyhow::Result<()> {
        match kind {
            JobKind::Briefing => {
                let markets = store.trending_markets(TOP_N_FOR_ROUNDUP)?;
                generator.run_briefing(&markets).await?;
            }
            JobKind::Trending => {
                let markets = store.trending_markets(TOP_N_FOR_ROUNDUP)?;
                generator.run_trending(&markets).await?;
            }
            JobKind::CategoryDigest(category) => {
                let markets = store.markets_by_category(category, TOP_N_FOR_ROUNDUP)?;
                if !markets.is_empty() {
                    generator.run_category_digest(category, &markets).await?;
                }
            }
        }
        Ok(())
    }

    /// Runs the job ticker: every minute, dispatch every job whose
    /// `next_run <= now` under a 5-minute timeout, then recompute its
    /// `next_run` (spec.md §4.8 "Job loop").
    pub async fn run_job_loop(self: Arc<Self>) {
        info!("scheduler job loop started");
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let now = Utc::now();
            for idx in self.due_job_indices(now) {
                let (name, kind) = {
                    let jobs = self.jobs.read();
                    let job = &jobs[idx];
                    (job.name.clone(), job.kind)
                };

                let result = tokio::time::timeout(
                    JOB_TIMEOUT,
                    Self::dispatch(&self.generator, &self.store, kind),
                )
                .await;

                match result {
                    Ok(Ok(())) => debug!(job = %name, "job dispatched"),
                    Ok(Err(e)) => warn!(job = %name, error = %e, "job failed"),
                    Err(_) => warn!(job = %name, "job timed out after 5 minutes"),
                }

                self.jobs.write()[idx].mark_dispatched(Utc::now());
            }
        }
    }

    /// Runs the Event Bus consumer: reacts to `breaking_move`, qualifying
    /// `new_market`/`threshold_cross`, and observes `volume_spike` without
    /// generating (spec.md §4.8 "Event loop").
    pub async fn run_event_loop(self: Arc<Self>) {
        info!("scheduler event loop started");
        let mut rx = self.bus.subscribe();
        loop {
            match rx.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "scheduler event loop lagged, events dropped");
                }
                Err(RecvError::Closed) => {
                    warn!("event bus closed, scheduler event loop exiting");
                    break;
                }
            }
        }
    }

    async fn handle_event(&self, event: MarketEvent) {
        match event.kind {
            EventKind::BreakingMove => self.spawn_breaking(event),
            EventKind::NewMarket => {
                if event.market.volume_24h >= NEW_MARKET_VOLUME_FLOOR {
                    self.spawn_new_market(event);
                }
            }
            EventKind::ThresholdCross => {
                if let Some(threshold) = event.metadata_f64("threshold") {
                    if threshold >= BREAKING_CROSS_HIGH || threshold <= BREAKING_CROSS_LOW {
                        self.spawn_breaking(event);
                    }
                }
            }
            EventKind::VolumeSpike => {
                debug!(market_id = %event.market.market_id, "volume spike observed");
            }
            EventKind::PriceChange | EventKind::TrendingUpdate => {}
        }
    }

    fn spawn_breaking(&self, event: MarketEvent) {
        let generator = self.generator.clone();
        tokio::spawn(async move {
            if let Err(e) = generator.on_breaking(&event).await {
                warn!(market_id = %event.market.market_id, error = %e, "breaking article generation failed");
            }
        });
    }

    fn spawn_new_market(&self, event: MarketEvent) {
        let generator = self.generator.clone();
        tokio::spawn(async move {
            if let Err(e) = generator.on_new_market(&event.market).await {
                warn!(market_id = %event.market.market_id, error = %e, "new-market article generation failed");
            }
        });
    }
}

/// Spawns both scheduler loops as independent long-running tasks.
pub fn spawn(scheduler: Arc<Scheduler>) {
    {
        let scheduler = scheduler.clone();
        tokio::spawn(scheduler.run_job_loop());
    }
    tokio::spawn(scheduler.run_event_loop());
}
