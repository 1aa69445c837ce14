//! Durable, indexed storage for markets, snapshots, articles, and
//! categories (spec.md §4.2). Grounded on `signals/db_storage.rs` in the
//! teacher: a `rusqlite::Connection` behind a `parking_lot::Mutex`, schema
//! and indexes applied idempotently via one `execute_batch` on open.

mod articles;
mod cache;
mod categories;
mod markets;
mod schema;
mod snapshots;

pub use categories::CategoryRow;

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use schema::{DEFAULT_CATEGORIES, SCHEMA_SQL};

/// Errors the Store can report back to a caller (spec.md §7).
#[derive(Debug)]
pub enum StoreError {
    /// DB transport loss; the caller should fail the current operation and
    /// rely on the next call to retry.
    Unavailable(String),
    /// Unique-key violation on upsert; recoverable because upsert
    /// semantics make the operation retryable.
    Conflict(String),
    NotFound,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            StoreError::Conflict(msg) => write!(f, "store conflict: {msg}"),
            StoreError::NotFound => write!(f, "not found"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (creating if absent) the database at `db_path`, apply the
    /// schema/index batch, and seed default categories. `:memory:` is a
    /// valid path for tests.
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("failed to open store at {db_path}"))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("failed to initialize store schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();
        if journal_mode.to_lowercase() != "wal" && db_path != ":memory:" {
            warn!(journal_mode, "WAL mode not active");
        }

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.seed_categories()?;

        info!(db_path, "store opened");
        Ok(store)
    }

    fn seed_categories(&self) -> Result<()> {
        let conn = self.conn.lock();
        for (name, label, is_dynamic) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, label, is_dynamic) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET label = excluded.label",
                rusqlite::params![name, label, *is_dynamic as i64],
            )
            .context("seeding default category")?;
        }
        Ok(())
    }
}
