//! Refreshes the denormalized `MarketRef` snapshots embedded in existing
//! articles so they reflect the market's current reading, rather than the
//! reading at generation time (spec.md §3 Article "Lifecycle"). A small
//! standalone CLI utility, matching the teacher's `src/bin/*.rs` pattern.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketwire_backend::models::MarketRef;
use marketwire_backend::store::Store;

#[derive(Parser, Debug)]
#[command(about = "Refresh embedded MarketRef snapshots on stored articles")]
struct Args {
    /// Path to the SQLite database to repair.
    #[arg(long, env = "DATABASE_PATH", default_value = "./marketwire.db")]
    database_path: String,

    /// Report what would change without writing anything.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let store = Store::open(&args.database_path).context("opening store")?;

    let articles = store.all_articles().context("loading articles")?;
    info!(count = articles.len(), "loaded articles for repair");

    let mut refreshed = 0usize;
    let mut missing = 0usize;

    for article in &articles {
        let mut changed = false;
        let mut new_markets = Vec::with_capacity(article.markets.len());

        for market_ref in &article.markets {
            match store.get_by_market_id(&market_ref.market_id)? {
                Some(current) => {
                    let fresh = MarketRef::from(&current);
                    if fresh.probability != market_ref.probability
                        || fresh.change_24h != market_ref.change_24h
                        || fresh.volume_24h != market_ref.volume_24h
                    {
                        changed = true;
                    }
                    new_markets.push(fresh);
                }
                None => {
                    warn!(market_id = %market_ref.market_id, article = %article.slug, "referenced market no longer exists, keeping stale snapshot");
                    missing += 1;
                    new_markets.push(market_ref.clone());
                }
            }
        }

        if !changed {
            continue;
        }

        let new_primary = new_markets
            .iter()
            .find(|m| m.market_id == article.primary_market.market_id)
            .cloned()
            .unwrap_or_else(|| article.primary_market.clone());

        if args.dry_run {
            info!(article = %article.slug, "would refresh market refs");
        } else {
            store.update_article_market_refs(article.id, &new_primary, &new_markets)?;
        }
        refreshed += 1;
    }

    info!(refreshed, missing, "repair pass complete");
    Ok(())
}
