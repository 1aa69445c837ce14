use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::models::{Category, Market};

use super::{Store, StoreError};

fn row_to_market(row: &Row) -> rusqlite::Result<Market> {
    let outcomes_json: String = row.get("outcomes_json")?;
    let outcome_prices_json: String = row.get("outcome_prices_json")?;
    let tags_json: String = row.get("tags_json")?;
    let category: String = row.get("category")?;
    let first_seen_at: String = row.get("first_seen_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Market {
        market_id: row.get("market_id")?,
        slug: row.get("slug")?,
        question: row.get("question")?,
        description: row.get("description")?,
        image: row.get("image")?,
        icon: row.get("icon")?,
        condition_id: row.get("condition_id")?,
        group_item_title: row.get("group_item_title")?,
        probability: row.get("probability")?,
        previous_prob: row.get("previous_prob")?,
        change_24h: row.get("change_24h")?,
        change_7d: row.get("change_7d")?,
        last_trade_price: row.get("last_trade_price")?,
        outcomes: serde_json::from_str(&outcomes_json).unwrap_or_default(),
        outcome_prices: serde_json::from_str(&outcome_prices_json).unwrap_or_default(),
        volume_1h: row.get("volume_1h")?,
        volume_24h: row.get("volume_24h")?,
        volume_7d: row.get("volume_7d")?,
        volume_total: row.get("volume_total")?,
        event_volume_24h: row.get("event_volume_24h")?,
        event_volume_total: row.get("event_volume_total")?,
        active: row.get::<_, i64>("active")? != 0,
        closed: row.get::<_, i64>("closed")? != 0,
        archived: row.get::<_, i64>("archived")? != 0,
        accepting_bids: row.get::<_, i64>("accepting_bids")? != 0,
        end_date: row.get("end_date")?,
        category: Category::parse(&category).unwrap_or(Category::Other),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        polymarket_url: row.get("polymarket_url")?,
        trending_score: row.get("trending_score")?,
        first_seen_at: first_seen_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
        updated_at: updated_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl Store {
    /// Upsert a market: `updated_at` always advances; `first_seen_at` is
    /// preserved if the row already exists, and set to `now` only the first
    /// time the market is observed (spec.md §4.2 `UpsertMarket`).
    pub fn upsert_market(&self, m: &Market) -> Result<()> {
        let conn = self.conn.lock();
        let now = Utc::now().to_rfc3339();

        let existing_first_seen: Option<String> = conn
            .query_row(
                "SELECT first_seen_at FROM markets WHERE market_id = ?1",
                [&m.market_id],
                |row| row.get(0),
            )
            .ok();
        let first_seen_at = existing_first_seen.unwrap_or_else(|| m.first_seen_at.to_rfc3339());

        let outcomes_json = serde_json::to_string(&m.outcomes)?;
        let outcome_prices_json = serde_json::to_string(&m.outcome_prices)?;
        let tags_json = serde_json::to_string(&m.tags)?;

        let result = conn.execute(
            "INSERT INTO markets (
                market_id, slug, question, description, image, icon, condition_id,
                group_item_title, probability, previous_prob, change_24h, change_7d,
                last_trade_price, outcomes_json, outcome_prices_json,
                volume_1h, volume_24h, volume_7d, volume_total,
                event_volume_24h, event_volume_total,
                active, closed, archived, accepting_bids, end_date,
                category, tags_json, polymarket_url, trending_score,
                first_seen_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
                ?31, ?32
            )
            ON CONFLICT(market_id) DO UPDATE SET
                slug = excluded.slug,
                question = excluded.question,
                description = excluded.description,
                image = excluded.image,
                icon = excluded.icon,
                condition_id = excluded.condition_id,
                group_item_title = excluded.group_item_title,
                probability = excluded.probability,
                previous_prob = excluded.previous_prob,
                change_24h = excluded.change_24h,
                change_7d = excluded.change_7d,
                last_trade_price = excluded.last_trade_price,
                outcomes_json = excluded.outcomes_json,
                outcome_prices_json = excluded.outcome_prices_json,
                volume_1h = excluded.volume_1h,
                volume_24h = excluded.volume_24h,
                volume_7d = excluded.volume_7d,
                volume_total = excluded.volume_total,
                event_volume_24h = excluded.event_volume_24h,
                event_volume_total = excluded.event_volume_total,
                active = excluded.active,
                closed = excluded.closed,
                archived = excluded.archived,
                accepting_bids = excluded.accepting_bids,
                end_date = excluded.end_date,
                category = excluded.category,
                tags_json = excluded.tags_json,
                polymarket_url = excluded.polymarket_url,
                trending_score = excluded.trending_score,
                updated_at = excluded.updated_at",
            params![
                m.market_id,
                m.slug,
                m.question,
                m.description,
                m.image,
                m.icon,
                m.condition_id,
                m.group_item_title,
                m.probability,
                m.previous_prob,
                m.change_24h,
                m.change_7d,
                m.last_trade_price,
                outcomes_json,
                outcome_prices_json,
                m.volume_1h,
                m.volume_24h,
                m.volume_7d,
                m.volume_total,
                m.event_volume_24h,
                m.event_volume_total,
                m.active as i64,
                m.closed as i64,
                m.archived as i64,
                m.accepting_bids as i64,
                m.end_date,
                m.category.as_str(),
                tags_json,
                m.polymarket_url,
                m.trending_score,
                first_seen_at,
                now,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict(format!("slug collision for {}", m.slug)).into())
            }
            Err(e) => Err(e).context("upsert_market"),
        }
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Market>> {
        let conn = self.conn.lock();
        conn.query_row(market_select("WHERE slug = ?1"), [slug], row_to_market)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other).context("get_by_slug"),
            })
    }

    pub fn get_by_market_id(&self, market_id: &str) -> Result<Option<Market>> {
        let conn = self.conn.lock();
        conn.query_row(
            market_select("WHERE market_id = ?1"),
            [market_id],
            row_to_market,
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other).context("get_by_market_id"),
        })
    }

    /// All active-and-open markets, used to rebuild the Syncer's in-memory
    /// cache on start (spec.md §4.4 step 1).
    pub fn all_active_open(&self) -> Result<Vec<Market>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(market_select(
            "WHERE active = 1 AND closed = 0 AND archived = 0",
        ))?;
        let rows = stmt
            .query_map([], row_to_market)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("all_active_open")?;
        Ok(rows)
    }

    /// Top-N by `trending_score` among active, non-closed markets.
    pub fn trending_markets(&self, n: usize) -> Result<Vec<Market>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(market_select(
            "WHERE active = 1 AND closed = 0 ORDER BY trending_score DESC LIMIT ?1",
        ))?;
        let rows = stmt
            .query_map(params![n as i64], row_to_market)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("trending_markets")?;
        Ok(rows)
    }

    /// Top-N by `volume_24h` within one category among active, non-closed
    /// markets.
    pub fn markets_by_category(&self, category: Category, n: usize) -> Result<Vec<Market>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(market_select(
            "WHERE active = 1 AND closed = 0 AND category = ?1 ORDER BY volume_24h DESC LIMIT ?2",
        ))?;
        let rows = stmt
            .query_map(params![category.as_str(), n as i64], row_to_market)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("markets_by_category")?;
        Ok(rows)
    }

    /// First-seen within `within`, newest-first, active markets.
    pub fn new_markets(&self, within: chrono::Duration, n: usize) -> Result<Vec<Market>> {
        let conn = self.conn.lock();
        let cutoff = (Utc::now() - within).to_rfc3339();
        let mut stmt = conn.prepare(market_select(
            "WHERE active = 1 AND first_seen_at >= ?1 ORDER BY first_seen_at DESC LIMIT ?2",
        ))?;
        let rows = stmt
            .query_map(params![cutoff, n as i64], row_to_market)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("new_markets")?;
        Ok(rows)
    }

    /// `|change_24h| >= theta`, top-N by `change_24h desc`, active.
    pub fn breaking_markets(&self, theta: f64, n: usize) -> Result<Vec<Market>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(market_select(
            "WHERE active = 1 AND ABS(change_24h) >= ?1 ORDER BY change_24h DESC LIMIT ?2",
        ))?;
        let rows = stmt
            .query_map(params![theta, n as i64], row_to_market)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("breaking_markets")?;
        Ok(rows)
    }
}

const MARKET_COLUMNS: &str = "market_id, slug, question, description, image, icon, condition_id,
    group_item_title, probability, previous_prob, change_24h, change_7d,
    last_trade_price, outcomes_json, outcome_prices_json,
    volume_1h, volume_24h, volume_7d, volume_total,
    event_volume_24h, event_volume_total,
    active, closed, archived, accepting_bids, end_date,
    category, tags_json, polymarket_url, trending_score,
    first_seen_at, updated_at";

fn market_select(suffix: &str) -> String {
    format!("SELECT {MARKET_COLUMNS} FROM markets {suffix}")
}
