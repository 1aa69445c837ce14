use crate::models::{CrossDirection, EventKind, Market, MarketEvent, Snapshot};

const THRESHOLDS: [f64; 3] = [0.50, 0.75, 0.90];

/// Thresholds that govern diff-driven event emission (spec.md §4.4), with
/// the teacher's defaults.
pub struct DiffConfig {
    pub breaking_threshold: f64,
    pub volume_multiplier: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            breaking_threshold: 0.05,
            volume_multiplier: 3.0,
        }
    }
}

/// Diffs `current` (freshly converted, not yet cache-aware) against `prior`
/// (the cached prior reading, `None` if never seen), mutates `current`'s
/// derived fields in place, and returns the events the move warrants.
pub fn diff_and_update(
    current: &mut Market,
    prior: Option<&Market>,
    cfg: &DiffConfig,
) -> Vec<MarketEvent> {
    let mut events = Vec::new();

    let Some(prior) = prior else {
        events.push(MarketEvent::new(EventKind::NewMarket, current.clone()));
        return events;
    };

    current.previous_prob = prior.probability;
    current.change_24h = current.probability - prior.probability;
    current.first_seen_at = prior.first_seen_at;

    // Not a persisted row, id 0 — the prior reading came from the cache,
    // not a `Store::save_snapshot` call (spec.md §4.3 "optionally the prior
    // snapshot").
    let prior_snapshot = Snapshot {
        id: 0,
        market_id: prior.market_id.clone(),
        probability: prior.probability,
        volume_24h: prior.volume_24h,
        liquidity: prior.volume_total,
        captured_at: prior.updated_at,
    };

    if current.change_24h.abs() >= cfg.breaking_threshold {
        events.push(
            MarketEvent::new(EventKind::BreakingMove, current.clone())
                .with_metadata("previous", prior.probability)
                .with_metadata("current", current.probability)
                .with_metadata("change", current.change_24h)
                .with_prior_snapshot(prior_snapshot.clone()),
        );
    }

    if prior.volume_24h > 0.0 {
        let multiplier = current.volume_24h / prior.volume_24h;
        if multiplier >= cfg.volume_multiplier {
            events.push(
                MarketEvent::new(EventKind::VolumeSpike, current.clone())
                    .with_metadata("previous", prior.volume_24h)
                    .with_metadata("current", current.volume_24h)
                    .with_metadata("multiplier", multiplier)
                    .with_prior_snapshot(prior_snapshot.clone()),
            );
        }
    }

    for threshold in THRESHOLDS {
        let prior_at_or_above = prior.probability >= threshold;
        let current_at_or_above = current.probability >= threshold;
        if prior_at_or_above != current_at_or_above {
            let direction = if current_at_or_above {
                CrossDirection::Up
            } else {
                CrossDirection::Down
            };
            events.push(
                MarketEvent::new(EventKind::ThresholdCross, current.clone())
                    .with_metadata("threshold", threshold)
                    .with_metadata("direction", direction)
                    .with_prior_snapshot(prior_snapshot.clone()),
            );
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;

    fn base_market(probability: f64, volume_24h: f64) -> Market {
        Market {
            market_id: "m1".into(),
            slug: "m1".into(),
            question: "q".into(),
            description: None,
            image: None,
            icon: None,
            condition_id: "c1".into(),
            group_item_title: None,
            probability,
            previous_prob: probability,
            change_24h: 0.0,
            change_7d: 0.0,
            last_trade_price: None,
            outcomes: vec!["Yes".into(), "No".into()],
            outcome_prices: vec![probability, 1.0 - probability],
            volume_1h: 0.0,
            volume_24h,
            volume_7d: 0.0,
            volume_total: 0.0,
            event_volume_24h: 0.0,
            event_volume_total: 0.0,
            active: true,
            closed: false,
            archived: false,
            accepting_bids: true,
            end_date: None,
            category: Category::Other,
            tags: vec![],
            polymarket_url: "https://polymarket.com/event/x".into(),
            trending_score: 0.0,
            first_seen_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn first_sighting_emits_new_market_only() {
        let mut current = base_market(0.4, 100.0);
        let events = diff_and_update(&mut current, None, &DiffConfig::default());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::NewMarket);
    }

    #[test]
    fn crossing_threshold_upward_emits_cross_event() {
        let prior = base_market(0.45, 100.0);
        let mut current = base_market(0.55, 100.0);
        let events = diff_and_update(&mut current, Some(&prior), &DiffConfig::default());
        let cross = events.iter().find(|e| e.kind == EventKind::ThresholdCross);
        assert!(cross.is_some());
        assert_eq!(cross.unwrap().metadata_f64("threshold"), Some(0.50));
    }

    #[test]
    fn large_probability_move_emits_breaking() {
        let prior = base_market(0.40, 100.0);
        let mut current = base_market(0.50, 100.0);
        let events = diff_and_update(&mut current, Some(&prior), &DiffConfig::default());
        assert!(events.iter().any(|e| e.kind == EventKind::BreakingMove));
        assert_eq!(current.change_24h, 0.10);
        assert_eq!(current.previous_prob, 0.40);
    }

    #[test]
    fn volume_spike_requires_positive_prior_volume() {
        let prior = base_market(0.5, 0.0);
        let mut current = base_market(0.5, 500.0);
        let events = diff_and_update(&mut current, Some(&prior), &DiffConfig::default());
        assert!(!events.iter().any(|e| e.kind == EventKind::VolumeSpike));
    }
}
