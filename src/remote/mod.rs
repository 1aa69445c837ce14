//! Typed read access to the venue's event/market/trade endpoints, with
//! retry and rate-aware pacing (spec.md §4.1). Grounded on the teacher's
//! `scrapers/polymarket_api.rs` (rate limiter, retry loop shape) and
//! `scrapers/polymarket_gamma.rs` (tolerant string/array deserialization).

mod client;
mod types;

pub use client::{RemoteClient, RemoteStatusError};
pub use types::{de_string_f64_opt, de_string_vec, Filter, RawEvent, RawMarket, RawTrade, SortDir};
