use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::models::{NewSnapshot, Snapshot};

use super::Store;

impl Store {
    pub fn save_snapshot(&self, s: &NewSnapshot) -> Result<Snapshot> {
        let conn = self.conn.lock();
        let captured_at = Utc::now();
        conn.execute(
            "INSERT INTO snapshots (market_id, probability, volume_24h, liquidity, captured_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                s.market_id,
                s.probability,
                s.volume_24h,
                s.liquidity,
                captured_at.to_rfc3339(),
            ],
        )
        .context("save_snapshot")?;

        Ok(Snapshot {
            id: conn.last_insert_rowid(),
            market_id: s.market_id.clone(),
            probability: s.probability,
            volume_24h: s.volume_24h,
            liquidity: s.liquidity,
            captured_at,
        })
    }

    /// Most recent snapshot strictly before `before`, used to diff a
    /// market's new reading against its last-known state (spec.md §4.4).
    pub fn latest_snapshot_before(
        &self,
        market_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<Snapshot>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, market_id, probability, volume_24h, liquidity, captured_at
             FROM snapshots
             WHERE market_id = ?1 AND captured_at < ?2
             ORDER BY captured_at DESC LIMIT 1",
            params![market_id, before.to_rfc3339()],
            row_to_snapshot,
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other).context("latest_snapshot_before"),
        })
    }

    pub fn snapshots_for_market(&self, market_id: &str, limit: usize) -> Result<Vec<Snapshot>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, market_id, probability, volume_24h, liquidity, captured_at
             FROM snapshots WHERE market_id = ?1 ORDER BY captured_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![market_id, limit as i64], row_to_snapshot)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("snapshots_for_market")?;
        Ok(rows)
    }

    /// Deletes snapshots older than `max_age`. Returns the number removed.
    pub fn clean_old_snapshots(&self, max_age: chrono::Duration) -> Result<usize> {
        let conn = self.conn.lock();
        let cutoff = (Utc::now() - max_age).to_rfc3339();
        let removed = conn
            .execute("DELETE FROM snapshots WHERE captured_at < ?1", params![cutoff])
            .context("clean_old_snapshots")?;
        Ok(removed)
    }
}

fn row_to_snapshot(row: &rusqlite::Row) -> rusqlite::Result<Snapshot> {
    let captured_at: String = row.get(5)?;
    Ok(Snapshot {
        id: row.get(0)?,
        market_id: row.get(1)?,
        probability: row.get(2)?,
        volume_24h: row.get(3)?,
        liquidity: row.get(4)?,
        captured_at: captured_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}
