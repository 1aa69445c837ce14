use chrono::Utc;

use crate::enrichment::EnrichedContext;
use crate::models::{
    ArticleBody, ArticleType, Category, Market, MarketEvent, MarketRef, NewArticle, Sentiment,
    Significance, SocialSignal,
};
use crate::syncer::generate_slug;

use super::llm::LlmClient;
use super::prompt::{fmt_pct, fmt_signed_pct, fmt_usd, parse_llm_json, LlmArticleDraft, SYSTEM_PROMPT};

fn parse_sentiment(s: &str) -> Sentiment {
    match s.to_lowercase().as_str() {
        "bullish" => Sentiment::Bullish,
        "bearish" => Sentiment::Bearish,
        _ => Sentiment::Neutral,
    }
}

fn parse_significance(s: &str) -> Significance {
    match s.to_lowercase().as_str() {
        "high" => Significance::High,
        "breaking" => Significance::Breaking,
        "low" => Significance::Low,
        _ => Significance::Medium,
    }
}

fn article_slug_from_headline(headline: &str) -> String {
    format!(
        "{}-{}",
        generate_slug(headline),
        Utc::now().format("%Y%m%d-%H%M")
    )
}

fn article_slug_from_template(template: &str) -> String {
    format!("{}-{}", template, Utc::now().format("%Y%m%d"))
}

struct Aggregates {
    total_volume: f64,
    biggest_mover: Option<String>,
    bullish_count: usize,
    bearish_count: usize,
}

fn aggregate(markets: &[Market]) -> Aggregates {
    let total_volume = markets.iter().map(|m| m.volume_24h).sum();
    let biggest_mover = markets
        .iter()
        .max_by(|a, b| a.change_24h.abs().partial_cmp(&b.change_24h.abs()).unwrap())
        .map(|m| format!("{} ({})", m.question, fmt_signed_pct(m.change_24h)));
    let bullish_count = markets.iter().filter(|m| m.change_24h > 0.0).count();
    let bearish_count = markets.iter().filter(|m| m.change_24h < 0.0).count();
    Aggregates {
        total_volume,
        biggest_mover,
        bullish_count,
        bearish_count,
    }
}

fn market_block(m: &Market) -> String {
    format!(
        "- {} | probability {} (was {}, {}) | 24h volume {}",
        m.question,
        fmt_pct(m.probability),
        fmt_pct(m.previous_prob),
        fmt_signed_pct(m.change_24h),
        fmt_usd(m.volume_24h),
    )
}

async fn call_llm(
    llm: &LlmClient,
    model: &str,
    user_prompt: &str,
    max_tokens: u32,
    temperature: f64,
) -> anyhow::Result<LlmArticleDraft> {
    let output = llm
        .chat_completion_json(model, SYSTEM_PROMPT, user_prompt, max_tokens, temperature)
        .await?;
    parse_llm_json(&output.content)
}

fn build_body(draft: &LlmArticleDraft) -> ArticleBody {
    ArticleBody {
        what_happened: draft.what_happened.clone(),
        why_it_matters: draft.why_it_matters.clone(),
        context: draft.context.clone(),
        what_to_watch: draft.what_to_watch.clone(),
        analysis: draft.analysis.clone(),
    }
}

fn empty_market_ref() -> MarketRef {
    MarketRef {
        market_id: String::new(),
        slug: String::new(),
        question: String::new(),
        probability: 0.0,
        change_24h: 0.0,
        volume_24h: 0.0,
    }
}

/// Assembles the final `NewArticle` from a parsed draft plus the market set
/// it was written about (spec.md §4.7 step 6).
fn article_from_draft(
    draft: LlmArticleDraft,
    article_type: ArticleType,
    slug: String,
    category: Category,
    markets: &[Market],
    social_signals: Vec<SocialSignal>,
    enrichment_sources: Vec<String>,
) -> NewArticle {
    let market_refs: Vec<MarketRef> = markets.iter().map(MarketRef::from).collect();
    let primary_market = market_refs.first().cloned().unwrap_or_else(empty_market_ref);

    NewArticle {
        slug,
        article_type,
        category,
        headline: draft.headline,
        subheadline: draft.subheadline,
        summary: draft.summary,
        body: build_body(&draft),
        primary_market,
        markets: market_refs,
        social_signals,
        tags: draft.tags,
        significance: parse_significance(&draft.significance),
        sentiment: parse_sentiment(&draft.sentiment),
        enrichment_sources,
        published: true,
    }
}

/// Triggered by a `breaking_move` or an extreme `threshold_cross` bus event
/// (spec.md §4.7). LLM unavailability is a hard failure for this flavor —
/// the caller only reaches here once a client is known to exist.
pub async fn generate_breaking(
    llm: &LlmClient,
    model: &str,
    event: &MarketEvent,
    enriched: &EnrichedContext,
    social_signals: &[SocialSignal],
) -> anyhow::Result<NewArticle> {
    let market = &event.market;
    let prompt = format!(
        "A prediction market just moved sharply.\n\n{}\n\nEnrichment context:\n{}\n\n\
         Write a breaking-news article about this move.",
        market_block(market),
        if enriched.summary.is_empty() {
            "(none available)".to_string()
        } else {
            enriched.summary.clone()
        },
    );

    let draft = call_llm(llm, model, &prompt, 900, 0.3).await?;

    Ok(article_from_draft(
        draft,
        ArticleType::Breaking,
        article_slug_from_headline(&market.question),
        market.category,
        std::slice::from_ref(market),
        social_signals.to_vec(),
        enriched.sources.clone(),
    ))
}

/// Triggered by `new_market` when `volume_24h >= 50_000` (spec.md §4.7).
/// Same hard-failure contract as `generate_breaking`.
pub async fn generate_new_market(
    llm: &LlmClient,
    model: &str,
    market: &Market,
    enriched: &EnrichedContext,
) -> anyhow::Result<NewArticle> {
    let prompt = format!(
        "A new prediction market just launched with meaningful volume.\n\n{}\n\n\
         Enrichment context:\n{}\n\nWrite a short explainer article introducing this market.",
        market_block(market),
        if enriched.summary.is_empty() {
            "(none available)".to_string()
        } else {
            enriched.summary.clone()
        },
    );

    let draft = call_llm(llm, model, &prompt, 700, 0.35).await?;

    Ok(article_from_draft(
        draft,
        ArticleType::NewMarket,
        article_slug_from_template(&format!("new-market-{}", market.slug)),
        market.category,
        std::slice::from_ref(market),
        Vec::new(),
        enriched.sources.clone(),
    ))
}

/// Templated fallback used when no LLM is configured, or the model call
/// fails, for any scheduled flavor (spec.md §4.7 "Failure": allowed outside
/// the breaking-style flavors).
fn templated_fallback(title: &str, markets: &[Market]) -> LlmArticleDraft {
    let agg = aggregate(markets);
    LlmArticleDraft {
        headline: title.to_string(),
        subheadline: format!(
            "{} markets, {} total 24h volume",
            markets.len(),
            fmt_usd(agg.total_volume)
        ),
        summary: format!(
            "{} markets tracked with combined 24h volume of {}.",
            markets.len(),
            fmt_usd(agg.total_volume)
        ),
        what_happened: "Automated summary generated without a language model.".to_string(),
        why_it_matters: "Market activity continues to be tracked across the covered set."
            .to_string(),
        context: markets.iter().take(5).map(|m| m.question.clone()).collect(),
        what_to_watch: agg
            .biggest_mover
            .unwrap_or_else(|| "No standout movers.".to_string()),
        analysis: None,
        tags: Vec::new(),
        sentiment: "neutral".to_string(),
        significance: "low".to_string(),
    }
}

async fn draft_with_fallback(
    llm: Option<&LlmClient>,
    model: &str,
    prompt: &str,
    fallback_title: &str,
    markets: &[Market],
    max_tokens: u32,
) -> LlmArticleDraft {
    match llm {
        Some(llm) => call_llm(llm, model, prompt, max_tokens, 0.35)
            .await
            .unwrap_or_else(|_| templated_fallback(fallback_title, markets)),
        None => templated_fallback(fallback_title, markets),
    }
}

/// Scheduled time-of-day briefing across the configured market set (spec.md
/// §4.7). Falls back to templated copy when no LLM is configured.
pub async fn generate_briefing(
    llm: Option<&LlmClient>,
    model: &str,
    markets: &[Market],
) -> NewArticle {
    let agg = aggregate(markets);
    let listing: String = markets.iter().map(|m| market_block(m) + "\n").collect();
    let prompt = format!(
        "Write a market briefing covering the following prediction markets.\n\n\
         Total 24h volume across markets: {}\nBiggest mover: {}\nBullish markets: {}, Bearish markets: {}\n\n{}",
        fmt_usd(agg.total_volume),
        agg.biggest_mover.as_deref().unwrap_or("none"),
        agg.bullish_count,
        agg.bearish_count,
        listing,
    );

    let draft = draft_with_fallback(llm, model, &prompt, "Market Briefing", markets, 1000).await;
    let category = markets.first().map(|m| m.category).unwrap_or(Category::Other);

    article_from_draft(
        draft,
        ArticleType::Briefing,
        article_slug_from_template("briefing"),
        category,
        markets,
        Vec::new(),
        Vec::new(),
    )
}

/// Scheduled interval: top-N by trending score (spec.md §4.7).
pub async fn generate_trending(
    llm: Option<&LlmClient>,
    model: &str,
    markets: &[Market],
) -> NewArticle {
    let agg = aggregate(markets);
    let listing: String = markets.iter().map(|m| market_block(m) + "\n").collect();
    let prompt = format!(
        "Write a trending-markets roundup.\n\nTotal 24h volume: {}\nBiggest mover: {}\n\n{}",
        fmt_usd(agg.total_volume),
        agg.biggest_mover.as_deref().unwrap_or("none"),
        listing,
    );

    let draft = draft_with_fallback(llm, model, &prompt, "Trending Now", markets, 900).await;
    let category = markets.first().map(|m| m.category).unwrap_or(Category::Other);
    let slug = article_slug_from_headline(&draft.headline);

    article_from_draft(
        draft,
        ArticleType::Trending,
        slug,
        category,
        markets,
        Vec::new(),
        Vec::new(),
    )
}

/// Scheduled daily, staggered per category (spec.md §4.7).
pub async fn generate_category_digest(
    llm: Option<&LlmClient>,
    model: &str,
    category: Category,
    markets: &[Market],
) -> NewArticle {
    let agg = aggregate(markets);
    let listing: String = markets.iter().map(|m| market_block(m) + "\n").collect();
    let prompt = format!(
        "Write a daily digest for the {} category.\n\nTotal 24h volume: {}\nBiggest mover: {}\n\n{}",
        category.as_str(),
        fmt_usd(agg.total_volume),
        agg.biggest_mover.as_deref().unwrap_or("none"),
        listing,
    );

    let title = format!("{} Digest", category.as_str());
    let draft = draft_with_fallback(llm, model, &prompt, &title, markets, 900).await;

    article_from_draft(
        draft,
        ArticleType::Digest,
        article_slug_from_template(&format!("digest-{}", category.as_str())),
        category,
        markets,
        Vec::new(),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn market(question: &str, change_24h: f64, volume_24h: f64) -> Market {
        Market {
            market_id: "m1".into(),
            slug: "m1-slug".into(),
            question: question.into(),
            description: None,
            image: None,
            icon: None,
            condition_id: "c1".into(),
            group_item_title: None,
            probability: 0.5,
            previous_prob: 0.5 - change_24h,
            change_24h,
            change_7d: 0.0,
            last_trade_price: None,
            outcomes: vec!["Yes".into(), "No".into()],
            outcome_prices: vec![0.5, 0.5],
            volume_1h: 0.0,
            volume_24h,
            volume_7d: 0.0,
            volume_total: volume_24h,
            event_volume_24h: 0.0,
            event_volume_total: 0.0,
            active: true,
            closed: false,
            archived: false,
            accepting_bids: true,
            end_date: None,
            category: Category::Crypto,
            tags: Vec::new(),
            polymarket_url: "https://polymarket.com/event/m1".into(),
            trending_score: 0.0,
            first_seen_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn templated_fallback_uses_aggregate_volume() {
        let markets = vec![market("Will X happen?", 0.1, 10_000.0), market("Will Y happen?", -0.02, 5_000.0)];
        let draft = templated_fallback("Briefing", &markets);
        assert_eq!(draft.significance, "low");
        assert!(draft.subheadline.contains("$15000"));
    }

    #[tokio::test]
    async fn generate_briefing_falls_back_without_llm_client() {
        let markets = vec![market("Will X happen?", 0.2, 20_000.0)];
        let article = generate_briefing(None, "unused-model", &markets).await;
        assert_eq!(article.headline, "Market Briefing");
        assert_eq!(article.markets.len(), 1);
    }
}
