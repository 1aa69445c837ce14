//! Wires config, store, remote client, event bus, syncer, generator, and
//! scheduler together, then serves the read API. Mirrors the teacher's
//! `main.rs`: env loading, `tracing_subscriber` init, one `tokio::spawn`
//! per long-running loop, axum server last.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketwire_backend::bus::EventBus;
use marketwire_backend::config::Config;
use marketwire_backend::generator::Generator;
use marketwire_backend::remote::RemoteClient;
use marketwire_backend::scheduler::Scheduler;
use marketwire_backend::store::Store;
use marketwire_backend::syncer::Syncer;
use marketwire_backend::middleware::{rate_limit_middleware, RateLimitConfig, RateLimitLayer};
use marketwire_backend::{api, AppState};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::from_env().context("loading configuration")?;
    info!(port = cfg.port, db = %cfg.database_path, "starting marketwire");

    let store = Store::open(&cfg.database_path).context("opening store")?;
    let remote = RemoteClient::new().context("building remote client")?;
    let bus = EventBus::new();

    let syncer = Arc::new(Syncer::new(store.clone(), remote, bus.clone(), &cfg));
    syncer.rebuild_cache_from_store().context("rebuilding syncer cache")?;
    marketwire_backend::syncer::spawn(syncer.clone(), cfg.clone());

    let generator = Arc::new(Generator::new(store.clone(), &cfg).context("building generator")?);
    let scheduler = Arc::new(Scheduler::new(generator, store.clone(), bus, &cfg));
    marketwire_backend::scheduler::spawn(scheduler);

    let rate_limiter = RateLimitLayer::new(RateLimitConfig::default());

    let app_state = AppState { store };
    let app: Router = api::router()
        .with_state(app_state)
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(
            marketwire_backend::middleware::request_logging,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!(%addr, "read API listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding http listener")?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("http server failed")?;

    Ok(())
}
