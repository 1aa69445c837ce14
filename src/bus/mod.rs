//! In-process pub/sub for `MarketEvent`s (spec.md §4.3). Single producer
//! (the Syncer), many subscribers (the Scheduler and future collaborators).
//! Grounded on the teacher's `broadcast::Sender<WsServerEvent>` idiom in
//! `main.rs` / `scrapers/binance_price_feed.rs`: a bounded broadcast channel
//! whose send is always non-blocking, and whose lagged receivers simply
//! skip ahead rather than stall the producer.

use tokio::sync::broadcast;
use tracing::warn;

use crate::models::MarketEvent;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Enqueues an event. Never blocks; with no subscribers attached the
    /// event is simply dropped (spec.md §4.3 delivery policy).
    pub fn publish(&self, event: MarketEvent) {
        if self.tx.send(event).is_err() {
            warn!("event bus has no subscribers, event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
