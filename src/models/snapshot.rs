use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Periodic time-stamped copy of a market's probability, volume, and
/// liquidity. Append-only; pruned by age (see `Store::clean_old_snapshots`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub market_id: String,
    pub probability: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub captured_at: DateTime<Utc>,
}

/// Fields needed to append a new snapshot row; `captured_at` is assigned by
/// the store on insert (spec.md §4.2 `SaveSnapshot`).
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub market_id: String,
    pub probability: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
}
