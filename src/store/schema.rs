/// Schema + index DDL, executed once via `execute_batch` on open (mirrors
/// the teacher's `signals/db_storage.rs` `SCHEMA_SQL` convention: one big
/// idempotent batch of `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT
/// EXISTS` statements).
pub const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS markets (
    market_id         TEXT PRIMARY KEY,
    slug              TEXT NOT NULL UNIQUE,
    question          TEXT NOT NULL,
    description       TEXT,
    image             TEXT,
    icon              TEXT,
    condition_id      TEXT NOT NULL,
    group_item_title  TEXT,
    probability       REAL NOT NULL,
    previous_prob     REAL NOT NULL,
    change_24h        REAL NOT NULL,
    change_7d         REAL NOT NULL,
    last_trade_price  REAL,
    outcomes_json      TEXT NOT NULL,
    outcome_prices_json TEXT NOT NULL,
    volume_1h         REAL NOT NULL,
    volume_24h        REAL NOT NULL,
    volume_7d         REAL NOT NULL,
    volume_total      REAL NOT NULL,
    event_volume_24h  REAL NOT NULL,
    event_volume_total REAL NOT NULL,
    active            INTEGER NOT NULL,
    closed            INTEGER NOT NULL,
    archived          INTEGER NOT NULL,
    accepting_bids    INTEGER NOT NULL,
    end_date          TEXT,
    category          TEXT NOT NULL,
    tags_json         TEXT NOT NULL,
    polymarket_url    TEXT NOT NULL,
    trending_score    REAL NOT NULL,
    first_seen_at     TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_markets_market_id ON markets(market_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_markets_slug ON markets(slug);
CREATE INDEX IF NOT EXISTS idx_markets_category ON markets(category);
CREATE INDEX IF NOT EXISTS idx_markets_trending_score ON markets(trending_score DESC);
CREATE INDEX IF NOT EXISTS idx_markets_volume_24h ON markets(volume_24h DESC);
CREATE INDEX IF NOT EXISTS idx_markets_change_24h ON markets(change_24h DESC);
CREATE INDEX IF NOT EXISTS idx_markets_first_seen_at ON markets(first_seen_at DESC);
CREATE INDEX IF NOT EXISTS idx_markets_active ON markets(active);

CREATE TABLE IF NOT EXISTS snapshots (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    market_id   TEXT NOT NULL,
    probability REAL NOT NULL,
    volume_24h  REAL NOT NULL,
    liquidity   REAL NOT NULL,
    captured_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_snapshots_market_captured
    ON snapshots(market_id, captured_at DESC);
CREATE INDEX IF NOT EXISTS idx_snapshots_captured_at ON snapshots(captured_at DESC);

CREATE TABLE IF NOT EXISTS articles (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    slug                TEXT NOT NULL UNIQUE,
    article_type        TEXT NOT NULL,
    category            TEXT NOT NULL,
    headline            TEXT NOT NULL,
    subheadline         TEXT NOT NULL,
    summary             TEXT NOT NULL,
    body_json           TEXT NOT NULL,
    primary_market_json TEXT NOT NULL,
    markets_json        TEXT NOT NULL,
    social_signals_json TEXT NOT NULL,
    tags_json           TEXT NOT NULL,
    significance        TEXT NOT NULL,
    sentiment           TEXT NOT NULL,
    enrichment_sources_json TEXT NOT NULL,
    views               INTEGER NOT NULL DEFAULT 0,
    published           INTEGER NOT NULL,
    featured            INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    published_at        TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_slug ON articles(slug);
CREATE INDEX IF NOT EXISTS idx_articles_type ON articles(article_type);
CREATE INDEX IF NOT EXISTS idx_articles_category ON articles(category);
CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles(published_at DESC);
CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published);
CREATE INDEX IF NOT EXISTS idx_articles_featured ON articles(featured);
CREATE INDEX IF NOT EXISTS idx_articles_tags ON articles(tags_json);

CREATE TABLE IF NOT EXISTS categories (
    name        TEXT PRIMARY KEY,
    label       TEXT NOT NULL,
    is_dynamic  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS kv_cache (
    cache_key  TEXT PRIMARY KEY,
    value_json TEXT NOT NULL,
    fetched_at INTEGER NOT NULL
);
"#;

/// Default static + dynamic categories seeded via upsert on open
/// (spec.md §4.2 "seeds the default categories via upsert").
pub const DEFAULT_CATEGORIES: &[(&str, &str, bool)] = &[
    ("politics", "Politics", false),
    ("elections", "Elections", false),
    ("crypto", "Crypto", false),
    ("finance", "Finance", false),
    ("economy", "Economy", false),
    ("earnings", "Earnings", false),
    ("tech", "Tech", false),
    ("sports", "Sports", false),
    ("geopolitics", "Geopolitics", false),
    ("world", "World", false),
    ("culture", "Culture", false),
    ("trending", "Trending", true),
    ("breaking", "Breaking", true),
    ("new", "New", true),
];
