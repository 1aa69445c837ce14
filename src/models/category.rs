use serde::{Deserialize, Serialize};

/// The fixed static taxonomy plus the `other` fallback (spec.md §3).
///
/// Dynamic labels (`trending`, `breaking`, `new`) are computed on read and
/// are not represented here — they never get persisted on a `Market` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Politics,
    Elections,
    Crypto,
    Finance,
    Economy,
    Earnings,
    Tech,
    Sports,
    Geopolitics,
    World,
    Culture,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Elections => "elections",
            Category::Crypto => "crypto",
            Category::Finance => "finance",
            Category::Economy => "economy",
            Category::Earnings => "earnings",
            Category::Tech => "tech",
            Category::Sports => "sports",
            Category::Geopolitics => "geopolitics",
            Category::World => "world",
            Category::Culture => "culture",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "politics" => Category::Politics,
            "elections" => Category::Elections,
            "crypto" => Category::Crypto,
            "finance" => Category::Finance,
            "economy" => Category::Economy,
            "earnings" => Category::Earnings,
            "tech" => Category::Tech,
            "sports" => Category::Sports,
            "geopolitics" => Category::Geopolitics,
            "world" => Category::World,
            "culture" => Category::Culture,
            "other" => Category::Other,
            _ => return None,
        })
    }

    /// Declaration order; classification ties break in this order
    /// (spec.md §4.4 "Classification").
    pub fn all_static() -> &'static [Category] {
        &[
            Category::Politics,
            Category::Elections,
            Category::Crypto,
            Category::Finance,
            Category::Economy,
            Category::Earnings,
            Category::Tech,
            Category::Sports,
            Category::Geopolitics,
            Category::World,
            Category::Culture,
        ]
    }

    /// Curated substring keyword list used by the question classifier
    /// (spec.md GLOSSARY "Category keywords").
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Politics => &[
                "president",
                "congress",
                "senate",
                "governor",
                "impeach",
                "cabinet",
                "white house",
                "legislation",
            ],
            Category::Elections => &[
                "election",
                "vote",
                "ballot",
                "primary",
                "nominee",
                "poll",
                "candidate",
            ],
            Category::Crypto => &[
                "bitcoin",
                "btc",
                "eth",
                "ethereum",
                "defi",
                "crypto",
                "token",
                "solana",
                "stablecoin",
            ],
            Category::Finance => &[
                "stock",
                "fed",
                "interest rate",
                "bank",
                "ipo",
                "s&p",
                "nasdaq",
                "bond",
            ],
            Category::Economy => &[
                "inflation",
                "recession",
                "gdp",
                "unemployment",
                "cpi",
                "jobs report",
            ],
            Category::Earnings => &["earnings", "revenue", "quarterly", "eps", "guidance"],
            Category::Tech => &[
                "ai",
                "openai",
                "apple",
                "google",
                "microsoft",
                "chip",
                "software",
                "startup",
            ],
            Category::Sports => &[
                "nfl",
                "nba",
                "mlb",
                "nhl",
                "championship",
                "super bowl",
                "world cup",
                "olympics",
            ],
            Category::Geopolitics => &[
                "war",
                "invasion",
                "sanctions",
                "treaty",
                "nato",
                "ceasefire",
                "military",
            ],
            Category::World => &["country", "nation", "global", "international", "united nations"],
            Category::Culture => &["movie", "oscar", "grammy", "celebrity", "album", "box office"],
            Category::Other => &[],
        }
    }

    /// First category (in declaration order) whose keyword list matches
    /// the lower-cased question; `other` if none match.
    pub fn classify(question: &str) -> Category {
        let q = question.to_lowercase();
        for cat in Category::all_static() {
            if cat.keywords().iter().any(|kw| q.contains(kw)) {
                return *cat;
            }
        }
        Category::Other
    }
}

/// Dynamic labels computed on read rather than persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicLabel {
    Trending,
    Breaking,
    New,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_matching_keyword() {
        assert_eq!(
            Category::classify("Will the President sign the bill?"),
            Category::Politics
        );
        assert_eq!(Category::classify("Will Bitcoin hit $100k?"), Category::Crypto);
        assert_eq!(Category::classify("Random unrelated question"), Category::Other);
    }

    #[test]
    fn roundtrips_through_as_str() {
        for cat in Category::all_static() {
            assert_eq!(Category::parse(cat.as_str()), Some(*cat));
        }
    }
}
