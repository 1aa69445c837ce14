//! Thin read-only HTTP surface backed exclusively by the Store (spec.md §1
//! "Out of scope... the read-only HTTP handlers", implemented here in the
//! teacher's `api/routes.rs` handler-per-query style since a repository
//! without a way to run it isn't believable as teacher-shaped output).

use axum::extract::{Path, Query, State as AxumState};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Duration;

use crate::api::dto::{
    parse_category, ArticlesQuery, ArticlesResponse, BreakingMarketsQuery, CategoriesResponse,
    ErrorResponse, LimitQuery, MarketsResponse, NewMarketsQuery,
};
use crate::models::Article;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/markets/trending", get(trending_markets))
        .route("/markets/new", get(new_markets))
        .route("/markets/breaking", get(breaking_markets))
        .route("/markets/category/:category", get(markets_by_category))
        .route("/markets/:slug", get(market_by_slug))
        .route("/articles/recent", get(recent_articles))
        .route("/articles/featured", get(featured_articles))
        .route("/articles/category/:category", get(articles_by_category))
        .route("/articles/:slug", get(article_by_slug))
        .route("/categories", get(categories))
}

async fn health() -> &'static str {
    "ok"
}

async fn trending_markets(
    AxumState(state): AxumState<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<MarketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let markets = state.store.trending_markets(q.limit).map_err(internal_error)?;
    Ok(Json(markets.into()))
}

async fn new_markets(
    AxumState(state): AxumState<AppState>,
    Query(q): Query<NewMarketsQuery>,
) -> Result<Json<MarketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let markets = state
        .store
        .new_markets(Duration::hours(q.within_hours), q.limit)
        .map_err(internal_error)?;
    Ok(Json(markets.into()))
}

async fn breaking_markets(
    AxumState(state): AxumState<AppState>,
    Query(q): Query<BreakingMarketsQuery>,
) -> Result<Json<MarketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let markets = state
        .store
        .breaking_markets(q.theta, q.limit)
        .map_err(internal_error)?;
    Ok(Json(markets.into()))
}

async fn markets_by_category(
    AxumState(state): AxumState<AppState>,
    Path(category): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<MarketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let category = parse_category(&category).ok_or_else(|| not_found("unknown category"))?;
    let markets = state
        .store
        .markets_by_category(category, q.limit)
        .map_err(internal_error)?;
    Ok(Json(markets.into()))
}

async fn market_by_slug(
    AxumState(state): AxumState<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<crate::models::Market>, (StatusCode, Json<ErrorResponse>)> {
    let market = state
        .store
        .get_by_slug(&slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("market not found"))?;
    Ok(Json(market))
}

async fn recent_articles(
    AxumState(state): AxumState<AppState>,
    Query(q): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let articles = state
        .store
        .recent_articles(q.published_only.unwrap_or(true), q.limit)
        .map_err(internal_error)?;
    Ok(Json(articles.into()))
}

async fn featured_articles(
    AxumState(state): AxumState<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<ArticlesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let articles = state.store.featured_articles(q.limit).map_err(internal_error)?;
    Ok(Json(articles.into()))
}

async fn articles_by_category(
    AxumState(state): AxumState<AppState>,
    Path(category): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<ArticlesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let category = parse_category(&category).ok_or_else(|| not_found("unknown category"))?;
    let articles = state
        .store
        .articles_by_category(category, q.limit)
        .map_err(internal_error)?;
    Ok(Json(articles.into()))
}

async fn article_by_slug(
    AxumState(state): AxumState<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, (StatusCode, Json<ErrorResponse>)> {
    let article = state
        .store
        .get_article_by_slug(&slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("article not found"))?;
    let _ = state.store.increment_article_views(article.id);
    Ok(Json(article))
}

async fn categories(
    AxumState(state): AxumState<AppState>,
) -> Result<Json<CategoriesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let categories = state.store.list_categories().map_err(internal_error)?;
    Ok(Json(CategoriesResponse { categories }))
}

fn internal_error(e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    tracing::warn!(error = %e, "api request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal error".to_string(),
        }),
    )
}

fn not_found(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
}
