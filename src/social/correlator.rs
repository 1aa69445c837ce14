use chrono::Utc;

use crate::models::{Market, MarketMovement, SocialSignal};

use super::tracker::TrackedPost;

const STOPWORDS: &[&str] = &[
    "the", "will", "this", "that", "with", "from", "have", "what", "when", "where", "which",
    "about", "there", "their", "would", "could", "should", "after", "before", "being", "these",
    "those", "does", "than", "then", "into", "over", "more", "most", "some", "such", "only",
    "very", "just", "also", "each", "other", "been", "were", "they", "them", "here", "while",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Lower-cases, tokenizes on whitespace, drops stop-words, keeps tokens
/// longer than 3 characters (spec.md §4.6).
pub fn extract_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()).to_string())
        .filter(|w| w.len() > 3 && !is_stopword(w))
        .collect()
}

fn count_keyword_matches(keywords: &[String], content_lower: &str) -> usize {
    keywords.iter().filter(|k| content_lower.contains(k.as_str())).count()
}

/// A post is relevant to a market when at least two extracted keywords
/// substring-match its content and it falls within the recency window
/// (spec.md §4.6).
pub fn is_relevant(
    keywords: &[String],
    post: &TrackedPost,
    time_window: chrono::Duration,
) -> bool {
    let content_lower = post.content.to_lowercase();
    let matches = count_keyword_matches(keywords, &content_lower);
    let age = Utc::now() - post.posted_at;
    matches >= 2 && age <= time_window
}

fn impact_window_label(window: chrono::Duration) -> String {
    let hours = window.num_hours();
    if hours <= 0 {
        format!("{}m", window.num_minutes())
    } else {
        format!("{hours}h")
    }
}

/// Produces a `SocialSignal` for a post already confirmed relevant to
/// `market`, using the market's own `change_24h` as the observed impact
/// (spec.md §4.6, single-market case).
pub fn build_signal(post: &TrackedPost, market: &Market, time_window: chrono::Duration) -> SocialSignal {
    SocialSignal {
        handle: post.handle.clone(),
        name: post.name.clone(),
        verified: post.verified,
        content: SocialSignal::excerpt(&post.content),
        permalink: SocialSignal::permalink_for(&post.handle, &post.platform_id),
        posted_at: post.posted_at,
        observed_at: Utc::now(),
        observed_impact: market.change_24h,
        impact_window: impact_window_label(time_window),
        affected_markets: vec![MarketMovement {
            slug: market.slug.clone(),
            title: market.question.clone(),
            probability_before: market.previous_prob,
            probability_after: market.probability,
            change: market.change_24h,
            time_delta_secs: (Utc::now() - post.posted_at).num_seconds(),
        }],
    }
}

/// Whole-feed correlation: for each post, scan the supplied candidate
/// markets and include only those whose `|change_24h|` clears
/// `min_market_change` and keyword-match the post. Sorted by absolute
/// observed impact descending, capped to `max_signals` (spec.md §4.6).
pub fn correlate_whole_feed(
    posts: &[TrackedPost],
    candidate_markets: &[Market],
    time_window: chrono::Duration,
    min_market_change: f64,
    max_signals: usize,
) -> Vec<SocialSignal> {
    let mut signals: Vec<SocialSignal> = Vec::new();

    for post in posts {
        let age = Utc::now() - post.posted_at;
        if age > time_window {
            continue;
        }
        let content_lower = post.content.to_lowercase();

        let mut movements = Vec::new();
        let mut total_impact = 0.0;
        for market in candidate_markets {
            if market.change_24h.abs() < min_market_change {
                continue;
            }
            let keywords = extract_keywords(&market.question);
            if count_keyword_matches(&keywords, &content_lower) < 2 {
                continue;
            }
            movements.push(MarketMovement {
                slug: market.slug.clone(),
                title: market.question.clone(),
                probability_before: market.previous_prob,
                probability_after: market.probability,
                change: market.change_24h,
                time_delta_secs: age.num_seconds(),
            });
            total_impact += market.change_24h;
        }

        if movements.is_empty() {
            continue;
        }

        signals.push(SocialSignal {
            handle: post.handle.clone(),
            name: post.name.clone(),
            verified: post.verified,
            content: SocialSignal::excerpt(&post.content),
            permalink: SocialSignal::permalink_for(&post.handle, &post.platform_id),
            posted_at: post.posted_at,
            observed_at: Utc::now(),
            observed_impact: total_impact,
            impact_window: impact_window_label(time_window),
            affected_markets: movements,
        });
    }

    signals.sort_by(|a, b| {
        b.observed_impact
            .abs()
            .partial_cmp(&a.observed_impact.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    signals.truncate(max_signals);
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(content: &str, age_mins: i64) -> TrackedPost {
        TrackedPost {
            platform_id: "123".into(),
            handle: "someone".into(),
            name: "Someone".into(),
            verified: true,
            content: content.into(),
            posted_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[test]
    fn keyword_extraction_drops_short_and_stop_words() {
        let keywords = extract_keywords("Will the Fed cut rates in March?");
        assert!(keywords.contains(&"rates".to_string()));
        assert!(keywords.contains(&"march".to_string()));
        assert!(!keywords.contains(&"will".to_string()));
        assert!(!keywords.contains(&"fed".to_string()));
    }

    #[test]
    fn relevance_requires_two_matches_and_recency() {
        let keywords = extract_keywords("Will the Fed cut interest rates in March?");
        let fresh = post("Fed signals interest rate cut likely in March meeting", 10);
        assert!(is_relevant(&keywords, &fresh, Duration::hours(2)));

        let stale = post("Fed signals interest rate cut likely in March meeting", 300);
        assert!(!is_relevant(&keywords, &stale, Duration::hours(2)));

        let weak = post("Completely unrelated content here", 10);
        assert!(!is_relevant(&keywords, &weak, Duration::hours(2)));
    }
}
