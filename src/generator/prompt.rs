use anyhow::{Context, Result};
use serde::Deserialize;

use super::GeneratorError;

/// The fixed JSON schema every flavor requests from the LLM (spec.md §4.7
/// step 5). Flavor-specific fields are additive and ignored here.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmArticleDraft {
    pub headline: String,
    pub subheadline: String,
    pub summary: String,
    pub what_happened: String,
    pub why_it_matters: String,
    #[serde(default)]
    pub context: Vec<String>,
    pub what_to_watch: String,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub sentiment: String,
    pub significance: String,
}

pub const SYSTEM_PROMPT: &str = "You are an editorial system that writes short, factual market-moving \
news articles about prediction-market activity. Respond with a single JSON object and nothing else. \
The object must have these exact keys: headline, subheadline, summary, what_happened, why_it_matters, \
context (array of strings), what_to_watch, analysis (string or null), tags (array of strings), \
sentiment (one of: bullish, bearish, neutral), significance (one of: low, medium, high, breaking). \
Do not wrap the JSON in markdown fences. Do not invent numbers not present in the prompt.";

/// Parses and validates the model's JSON response. A parse failure is the
/// operation's defined hard error (spec.md §4.7 step 6: `LLMResponseMalformed`,
/// no article produced).
pub fn parse_llm_json(content: &str) -> Result<LlmArticleDraft> {
    let trimmed = content.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```");
    serde_json::from_str::<LlmArticleDraft>(trimmed.trim())
        .map_err(|e| GeneratorError::LlmResponseMalformed(e.to_string()).into())
        .context("parsing LLM article draft")
}

pub fn fmt_usd(v: f64) -> String {
    format!("${v:.0}")
}

pub fn fmt_pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

pub fn fmt_signed_pct(v: f64) -> String {
    format!("{}{:.1}%", if v >= 0.0 { "+" } else { "" }, v * 100.0)
}
