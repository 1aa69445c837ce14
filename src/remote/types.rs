use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Normalizes a field that may arrive as a real JSON array or as a
/// JSON-encoded string (spec.md §4.1 "responses may encode nested arrays as
/// JSON-encoded strings"). Grounded on the teacher's `de_string_vec` in
/// `scrapers/polymarket_gamma.rs`.
pub fn de_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::Array(arr) => Ok(arr
            .into_iter()
            .filter_map(|x| match x {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()),
        Value::String(s) => Ok(serde_json::from_str::<Vec<String>>(&s).unwrap_or_default()),
        _ => Ok(Vec::new()),
    }
}

/// Parses a JSON-encoded array of numeric strings into floats. Parse
/// failures on an individual entry drop that entry rather than failing the
/// whole call (spec.md §4.1).
pub fn de_string_f64_vec<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    let raw: Vec<String> = match v {
        Value::Array(arr) => arr
            .into_iter()
            .filter_map(|x| match x {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => serde_json::from_str::<Vec<String>>(&s).unwrap_or_default(),
        _ => Vec::new(),
    };
    Ok(raw.iter().filter_map(|s| s.parse::<f64>().ok()).collect())
}

pub fn de_string_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => {
            if s.is_empty() {
                Ok(None)
            } else {
                Ok(s.parse::<f64>().ok())
            }
        }
        _ => Ok(None),
    }
}

fn de_string_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_string_f64_opt(deserializer)?.unwrap_or(0.0))
}

/// A market embedded within a Gamma event response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawMarket {
    pub id: String,
    pub slug: String,
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "conditionId")]
    pub condition_id: String,
    #[serde(rename = "groupItemTitle", default)]
    pub group_item_title: Option<String>,
    #[serde(deserialize_with = "de_string_vec")]
    pub outcomes: Vec<String>,
    #[serde(rename = "outcomePrices", deserialize_with = "de_string_f64_vec")]
    pub outcome_prices: Vec<f64>,
    #[serde(rename = "lastTradePrice", default, deserialize_with = "de_string_f64_opt")]
    pub last_trade_price: Option<f64>,
    #[serde(default, deserialize_with = "de_string_f64")]
    pub volume: f64,
    #[serde(rename = "volume24hr", default, deserialize_with = "de_string_f64")]
    pub volume_24hr: f64,
    #[serde(rename = "volume1wk", default, deserialize_with = "de_string_f64")]
    pub volume_1wk: f64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(rename = "acceptingOrders", default)]
    pub accepting_orders: bool,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
}

/// A Gamma event: the parent container the Syncer actually lists by 24h
/// volume, carrying one or more embedded markets (spec.md §4.4 step 2).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawEvent {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_string_f64")]
    pub volume: f64,
    #[serde(rename = "volume24hr", default, deserialize_with = "de_string_f64")]
    pub volume_24hr: f64,
    #[serde(default, deserialize_with = "de_string_vec")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub markets: Vec<RawMarket>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawTrade {
    pub id: String,
    pub market: String,
    #[serde(rename = "assetId", default)]
    pub asset_id: Option<String>,
    pub side: String,
    #[serde(deserialize_with = "de_string_f64")]
    pub size: f64,
    #[serde(deserialize_with = "de_string_f64")]
    pub price: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Filter shared by every Remote Client read family (spec.md §4.1).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub archived: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDir>,
    pub category: Option<String>,
    pub query: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sorted_by(mut self, field: &str, dir: SortDir) -> Self {
        self.sort_by = Some(field.to_string());
        self.sort_dir = Some(dir);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active = Some(true);
        self.closed = Some(false);
        self.archived = Some(false);
        self
    }

    pub(super) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(v) = self.active {
            out.push(("active", v.to_string()));
        }
        if let Some(v) = self.closed {
            out.push(("closed", v.to_string()));
        }
        if let Some(v) = self.archived {
            out.push(("archived", v.to_string()));
        }
        if let Some(v) = self.limit {
            out.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset {
            out.push(("offset", v.to_string()));
        }
        if let Some(v) = &self.sort_by {
            out.push(("order", v.clone()));
        }
        if let Some(v) = self.sort_dir {
            out.push(("ascending", (v == SortDir::Asc).to_string()));
        }
        if let Some(v) = &self.category {
            out.push(("tag", v.clone()));
        }
        if let Some(v) = &self.query {
            out.push(("search", v.clone()));
        }
        out
    }
}
