use chrono::Utc;

use crate::models::{Category, Market};
use crate::remote::{RawEvent, RawMarket};

use super::slug::generate_slug;

/// Builds a normalized `Market` from a remote market embedded in its parent
/// event (spec.md §4.4 "Conversion"). Probabilities, trending score, and
/// diff-derived fields (`previous_prob`, `change_24h`, `first_seen_at`) are
/// left at fresh-market defaults here; the caller's diff pass fills them in
/// against the cache.
///
/// The canonical `polymarket_url` is built from the **event** slug, never
/// the market slug — a prior bug used the market slug and must not be
/// reintroduced.
pub fn convert_market(event: &RawEvent, raw: &RawMarket) -> Market {
    let probability = raw.outcome_prices.first().copied().unwrap_or(0.5);
    let now = Utc::now();

    Market {
        market_id: raw.id.clone(),
        slug: generate_slug(&raw.question),
        question: raw.question.clone(),
        description: raw.description.clone().or_else(|| event.description.clone()),
        image: raw.image.clone(),
        icon: raw.icon.clone(),
        condition_id: raw.condition_id.clone(),
        group_item_title: raw.group_item_title.clone(),
        probability,
        previous_prob: probability,
        change_24h: 0.0,
        change_7d: 0.0,
        last_trade_price: raw.last_trade_price,
        outcomes: raw.outcomes.clone(),
        outcome_prices: raw.outcome_prices.clone(),
        volume_1h: 0.0,
        volume_24h: raw.volume_24hr,
        volume_7d: raw.volume_1wk,
        volume_total: raw.volume,
        event_volume_24h: event.volume_24hr,
        event_volume_total: event.volume,
        active: raw.active,
        closed: raw.closed,
        archived: raw.archived,
        accepting_bids: raw.accepting_orders,
        end_date: raw.end_date.clone(),
        category: Category::classify(&raw.question),
        tags: event.tags.clone(),
        polymarket_url: format!("https://polymarket.com/event/{}", event.slug),
        trending_score: 0.0,
        first_seen_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> RawEvent {
        RawEvent {
            id: "ev1".into(),
            slug: "event-slug".into(),
            title: "Event".into(),
            description: None,
            volume: 500.0,
            volume_24hr: 100.0,
            tags: vec!["politics".into()],
            markets: vec![],
        }
    }

    fn sample_market() -> RawMarket {
        RawMarket {
            id: "m1".into(),
            slug: "market-slug".into(),
            question: "Will the Fed cut rates?".into(),
            description: None,
            image: None,
            icon: None,
            condition_id: "cond1".into(),
            group_item_title: None,
            outcomes: vec!["Yes".into(), "No".into()],
            outcome_prices: vec![0.62, 0.38],
            last_trade_price: Some(0.62),
            volume: 1000.0,
            volume_24hr: 200.0,
            volume_1wk: 800.0,
            active: true,
            closed: false,
            archived: false,
            accepting_orders: true,
            end_date: None,
        }
    }

    #[test]
    fn uses_event_slug_for_url_not_market_slug() {
        let m = convert_market(&sample_event(), &sample_market());
        assert_eq!(m.polymarket_url, "https://polymarket.com/event/event-slug");
        assert_ne!(m.polymarket_url, "https://polymarket.com/event/market-slug");
    }

    #[test]
    fn probability_is_first_outcome_price() {
        let m = convert_market(&sample_event(), &sample_market());
        assert_eq!(m.probability, 0.62);
        assert_eq!(m.yes_price(), 0.62);
    }
}
