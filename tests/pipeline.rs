//! End-to-end coverage across Store, the Event Bus, and the Generator's
//! LLM-less fallback path, without touching the network. Diff/threshold
//! logic itself is covered at the unit level in `syncer::diff`.

use chrono::Utc;

use marketwire_backend::bus::EventBus;
use marketwire_backend::config::Config;
use marketwire_backend::generator::Generator;
use marketwire_backend::models::{Category, EventKind, Market, MarketEvent};
use marketwire_backend::store::Store;

fn market(id: &str, question: &str, probability: f64, volume_24h: f64) -> Market {
    Market {
        market_id: id.into(),
        slug: format!("{id}-slug"),
        question: question.into(),
        description: None,
        image: None,
        icon: None,
        condition_id: format!("cond-{id}"),
        group_item_title: None,
        probability,
        previous_prob: probability,
        change_24h: 0.0,
        change_7d: 0.0,
        last_trade_price: Some(probability),
        outcomes: vec!["Yes".into(), "No".into()],
        outcome_prices: vec![probability, 1.0 - probability],
        volume_1h: 0.0,
        volume_24h,
        volume_7d: volume_24h * 5.0,
        volume_total: volume_24h * 10.0,
        event_volume_24h: volume_24h,
        event_volume_total: volume_24h * 10.0,
        active: true,
        closed: false,
        archived: false,
        accepting_bids: true,
        end_date: None,
        category: Category::Politics,
        tags: vec!["election".into()],
        polymarket_url: "https://polymarket.com/event/sample-event".into(),
        trending_score: 0.0,
        first_seen_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn store_round_trips_a_market_and_serves_it_back_by_slug() {
    let store = Store::open(":memory:").expect("open store");
    let m = market("m1", "Will the Fed cut rates?", 0.6, 50_000.0);

    store.upsert_market(&m).expect("upsert");
    let fetched = store
        .get_by_slug(&m.slug)
        .expect("query")
        .expect("present");

    assert_eq!(fetched.market_id, "m1");
    assert_eq!(fetched.probability, 0.6);
}

#[test]
fn store_filters_breaking_markets_by_theta() {
    let store = Store::open(":memory:").expect("open store");

    let mut calm = market("m2", "Will turnout exceed forecast?", 0.5, 20_000.0);
    calm.change_24h = 0.01;
    let mut hot = market("m3", "Will the verdict be guilty?", 0.7, 30_000.0);
    hot.change_24h = 0.12;

    store.upsert_market(&calm).expect("upsert calm");
    store.upsert_market(&hot).expect("upsert hot");

    let breaking = store.breaking_markets(0.05, 10).expect("query");
    assert_eq!(breaking.len(), 1);
    assert_eq!(breaking[0].market_id, "m3");
}

#[tokio::test]
async fn event_bus_delivers_published_events_to_subscribers() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    let m = market("m4", "Will the bill pass?", 0.8, 5_000.0);
    let event = MarketEvent::new(EventKind::ThresholdCross, m);
    bus.publish(event);

    let received = rx.recv().await.expect("event delivered");
    assert_eq!(received.kind, EventKind::ThresholdCross);
    assert_eq!(received.market.market_id, "m4");
}

#[tokio::test]
async fn event_bus_with_no_subscribers_drops_silently() {
    let bus = EventBus::new();
    let m = market("m5", "Will the treaty be ratified?", 0.4, 8_000.0);
    // No subscriber attached; publish must not panic or block.
    bus.publish(MarketEvent::new(EventKind::NewMarket, m));
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn generator_falls_back_to_templated_copy_without_an_llm_client_and_saves_it() {
    let store = Store::open(":memory:").expect("open store");
    let cfg = Config::from_env().expect("load config with defaults, no env vars set");
    assert!(cfg.llm_api_key.is_none());

    let generator = Generator::new(store.clone(), &cfg).expect("build generator");

    let markets = vec![
        market("m6", "Will candidate A win?", 0.62, 120_000.0),
        market("m7", "Will candidate B concede?", 0.18, 60_000.0),
    ];

    let article = generator
        .run_trending(&markets)
        .await
        .expect("trending article generated");

    let reloaded = store
        .get_article_by_slug(&article.slug)
        .expect("query")
        .expect("article persisted");
    assert_eq!(reloaded.headline, article.headline);
    assert_eq!(reloaded.markets.len(), 2);
}
