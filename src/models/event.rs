use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Market, Snapshot};

/// Typed event kinds the Syncer emits onto the bus (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewMarket,
    PriceChange,
    BreakingMove,
    VolumeSpike,
    ThresholdCross,
    TrendingUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossDirection {
    Up,
    Down,
}

/// Untyped metadata carried alongside an event (threshold value, crossing
/// direction, multiplier, previous/current readings). Kept as a JSON map
/// rather than a closed enum because each `EventKind` attaches a different
/// shape and the bus itself never inspects it — only subscribers do.
pub type EventMetadata = HashMap<String, serde_json::Value>;

/// An event dispatched on the Event Bus. Carries the current market state,
/// optionally the prior snapshot, and a typed metadata map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    pub kind: EventKind,
    pub market: Market,
    pub prior_snapshot: Option<Snapshot>,
    pub timestamp: DateTime<Utc>,
    pub metadata: EventMetadata,
}

impl MarketEvent {
    pub fn new(kind: EventKind, market: Market) -> Self {
        Self {
            kind,
            market,
            prior_snapshot: None,
            timestamp: Utc::now(),
            metadata: EventMetadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.to_string(), v);
        }
        self
    }

    /// Attaches the prior reading this event was diffed against (spec.md
    /// §4.3 "optionally the prior snapshot").
    pub fn with_prior_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.prior_snapshot = Some(snapshot);
        self
    }

    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(|v| v.as_f64())
    }
}
