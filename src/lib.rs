//! Library surface for the `marketwire` binary and its companion
//! `repair_market_refs` utility: every core module plus the thin
//! `AppState` the read API is built around.

pub mod api;
pub mod bus;
pub mod config;
pub mod enrichment;
pub mod generator;
pub mod middleware;
pub mod models;
pub mod remote;
pub mod scheduler;
pub mod social;
pub mod store;
pub mod syncer;

use store::Store;

/// Shared state handed to every axum route. Deliberately thin: the read API
/// touches only the Store (spec.md §2 "The read API reads from `Store`
/// only").
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}
