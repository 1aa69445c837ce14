use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::models::{
    Article, ArticleBody, ArticleType, Category, MarketRef, NewArticle, Sentiment, Significance,
    SocialSignal,
};

use super::{Store, StoreError};

fn parse_article_type(s: &str) -> ArticleType {
    match s {
        "breaking" => ArticleType::Breaking,
        "briefing" => ArticleType::Briefing,
        "trending" => ArticleType::Trending,
        "new_market" => ArticleType::NewMarket,
        "deep_dive" => ArticleType::DeepDive,
        "digest" => ArticleType::Digest,
        _ => ArticleType::Explainer,
    }
}

fn parse_significance(s: &str) -> Significance {
    match s {
        "low" => Significance::Low,
        "medium" => Significance::Medium,
        "high" => Significance::High,
        _ => Significance::Breaking,
    }
}

fn parse_sentiment(s: &str) -> Sentiment {
    match s {
        "bullish" => Sentiment::Bullish,
        "bearish" => Sentiment::Bearish,
        _ => Sentiment::Neutral,
    }
}

fn row_to_article(row: &Row) -> rusqlite::Result<Article> {
    let body_json: String = row.get("body_json")?;
    let primary_market_json: String = row.get("primary_market_json")?;
    let markets_json: String = row.get("markets_json")?;
    let social_signals_json: String = row.get("social_signals_json")?;
    let tags_json: String = row.get("tags_json")?;
    let enrichment_sources_json: String = row.get("enrichment_sources_json")?;
    let article_type: String = row.get("article_type")?;
    let category: String = row.get("category")?;
    let significance: String = row.get("significance")?;
    let sentiment: String = row.get("sentiment")?;
    let created_at: String = row.get("created_at")?;
    let published_at: String = row.get("published_at")?;

    let body: ArticleBody = serde_json::from_str(&body_json).unwrap_or(ArticleBody {
        what_happened: String::new(),
        why_it_matters: String::new(),
        context: Vec::new(),
        what_to_watch: String::new(),
        analysis: None,
    });
    let primary_market: MarketRef = serde_json::from_str(&primary_market_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))?;
    let markets: Vec<MarketRef> = serde_json::from_str(&markets_json).unwrap_or_default();
    let social_signals: Vec<SocialSignal> =
        serde_json::from_str(&social_signals_json).unwrap_or_default();
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let enrichment_sources: Vec<String> =
        serde_json::from_str(&enrichment_sources_json).unwrap_or_default();

    Ok(Article {
        id: row.get("id")?,
        slug: row.get("slug")?,
        article_type: parse_article_type(&article_type),
        category: Category::parse(&category).unwrap_or(Category::Other),
        headline: row.get("headline")?,
        subheadline: row.get("subheadline")?,
        summary: row.get("summary")?,
        body,
        primary_market,
        markets,
        social_signals,
        tags,
        significance: parse_significance(&significance),
        sentiment: parse_sentiment(&sentiment),
        enrichment_sources,
        views: row.get("views")?,
        published: row.get::<_, i64>("published")? != 0,
        featured: row.get::<_, i64>("featured")? != 0,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
        published_at: published_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}

const ARTICLE_COLUMNS: &str = "id, slug, article_type, category, headline, subheadline, summary,
    body_json, primary_market_json, markets_json, social_signals_json, tags_json,
    significance, sentiment, enrichment_sources_json, views, published, featured,
    created_at, published_at";

fn article_select(suffix: &str) -> String {
    format!("SELECT {ARTICLE_COLUMNS} FROM articles {suffix}")
}

impl Store {
    /// Inserts a new article. Fails with `StoreError::Conflict` if the slug
    /// is already taken (spec.md §4.2 `SaveArticle`).
    pub fn save_article(&self, a: &NewArticle) -> Result<Article> {
        let conn = self.conn.lock();
        let now = Utc::now();

        let body_json = serde_json::to_string(&a.body)?;
        let primary_market_json = serde_json::to_string(&a.primary_market)?;
        let markets_json = serde_json::to_string(&a.markets)?;
        let social_signals_json = serde_json::to_string(&a.social_signals)?;
        let tags_json = serde_json::to_string(&a.tags)?;
        let enrichment_sources_json = serde_json::to_string(&a.enrichment_sources)?;

        let result = conn.execute(
            "INSERT INTO articles (
                slug, article_type, category, headline, subheadline, summary,
                body_json, primary_market_json, markets_json, social_signals_json, tags_json,
                significance, sentiment, enrichment_sources_json, views, published, featured,
                created_at, published_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0, ?15, 0, ?16, ?17
            )",
            params![
                a.slug,
                a.article_type.as_str(),
                a.category.as_str(),
                a.headline,
                a.subheadline,
                a.summary,
                body_json,
                primary_market_json,
                markets_json,
                social_signals_json,
                tags_json,
                significance_str(a.significance),
                sentiment_str(a.sentiment),
                enrichment_sources_json,
                a.published as i64,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::Conflict(format!("slug collision for {}", a.slug)).into());
            }
            Err(e) => return Err(e).context("save_article"),
        }

        let id = conn.last_insert_rowid();
        Ok(Article {
            id,
            slug: a.slug.clone(),
            article_type: a.article_type,
            category: a.category,
            headline: a.headline.clone(),
            subheadline: a.subheadline.clone(),
            summary: a.summary.clone(),
            body: a.body.clone(),
            primary_market: a.primary_market.clone(),
            markets: a.markets.clone(),
            social_signals: a.social_signals.clone(),
            tags: a.tags.clone(),
            significance: a.significance,
            sentiment: a.sentiment,
            enrichment_sources: a.enrichment_sources.clone(),
            views: 0,
            published: a.published,
            featured: false,
            created_at: now,
            published_at: now,
        })
    }

    pub fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let conn = self.conn.lock();
        conn.query_row(article_select("WHERE slug = ?1"), [slug], row_to_article)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other).context("get_article_by_slug"),
            })
    }

    pub fn increment_article_views(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE articles SET views = views + 1 WHERE id = ?1",
                params![id],
            )
            .context("increment_article_views")?;
        if changed == 0 {
            return Err(StoreError::NotFound.into());
        }
        Ok(())
    }

    pub fn recent_articles(&self, published_only: bool, n: usize) -> Result<Vec<Article>> {
        let conn = self.conn.lock();
        let suffix = if published_only {
            "WHERE published = 1 ORDER BY published_at DESC LIMIT ?1"
        } else {
            "ORDER BY published_at DESC LIMIT ?1"
        };
        let mut stmt = conn.prepare(article_select(suffix))?;
        let rows = stmt
            .query_map(params![n as i64], row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("recent_articles")?;
        Ok(rows)
    }

    pub fn articles_by_category(&self, category: Category, n: usize) -> Result<Vec<Article>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(article_select(
            "WHERE published = 1 AND category = ?1 ORDER BY published_at DESC LIMIT ?2",
        ))?;
        let rows = stmt
            .query_map(params![category.as_str(), n as i64], row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("articles_by_category")?;
        Ok(rows)
    }

    pub fn featured_articles(&self, n: usize) -> Result<Vec<Article>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(article_select(
            "WHERE published = 1 AND featured = 1 ORDER BY published_at DESC LIMIT ?1",
        ))?;
        let rows = stmt
            .query_map(params![n as i64], row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("featured_articles")?;
        Ok(rows)
    }

    /// Every article regardless of publish state, oldest first. Used by the
    /// `repair_market_refs` utility, never by the read API.
    pub fn all_articles(&self) -> Result<Vec<Article>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(article_select("ORDER BY id ASC"))?;
        let rows = stmt
            .query_map([], row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("all_articles")?;
        Ok(rows)
    }

    /// Overwrites an article's denormalized `MarketRef` snapshots in place
    /// (spec.md §3 Article "Lifecycle": mutable only for view counts,
    /// feature flags, and embedded market-reference refresh).
    pub fn update_article_market_refs(
        &self,
        id: i64,
        primary_market: &MarketRef,
        markets: &[MarketRef],
    ) -> Result<()> {
        let conn = self.conn.lock();
        let primary_market_json = serde_json::to_string(primary_market)?;
        let markets_json = serde_json::to_string(markets)?;
        let changed = conn
            .execute(
                "UPDATE articles SET primary_market_json = ?1, markets_json = ?2 WHERE id = ?3",
                params![primary_market_json, markets_json, id],
            )
            .context("update_article_market_refs")?;
        if changed == 0 {
            return Err(StoreError::NotFound.into());
        }
        Ok(())
    }
}

fn significance_str(s: Significance) -> &'static str {
    match s {
        Significance::Low => "low",
        Significance::Medium => "medium",
        Significance::High => "high",
        Significance::Breaking => "breaking",
    }
}

fn sentiment_str(s: Sentiment) -> &'static str {
    match s {
        Sentiment::Bullish => "bullish",
        Sentiment::Bearish => "bearish",
        Sentiment::Neutral => "neutral",
    }
}
