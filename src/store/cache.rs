use anyhow::{Context, Result};
use rusqlite::params;
use serde::{de::DeserializeOwned, Serialize};

use super::Store;

/// A small TTL-backed key/value cache riding on the same connection, used by
/// the Enricher and Social Correlator to avoid re-fetching upstream lookups
/// within a window (mirrors the teacher's `get_cache`/`upsert_cache` pair in
/// `signals/db_storage.rs`).
impl Store {
    pub fn cache_get<T: DeserializeOwned>(&self, key: &str, max_age_secs: i64) -> Result<Option<T>> {
        let conn = self.conn.lock();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value_json, fetched_at FROM kv_cache WHERE cache_key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .ok();

        let Some((value_json, fetched_at)) = row else {
            return Ok(None);
        };
        let now = chrono::Utc::now().timestamp();
        if now - fetched_at > max_age_secs {
            return Ok(None);
        }
        let value = serde_json::from_str(&value_json).context("cache_get deserialize")?;
        Ok(Some(value))
    }

    pub fn cache_put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let conn = self.conn.lock();
        let value_json = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO kv_cache (cache_key, value_json, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(cache_key) DO UPDATE SET value_json = excluded.value_json, fetched_at = excluded.fetched_at",
            params![key, value_json, now],
        )
        .context("cache_put")?;
        Ok(())
    }
}
