// Main entry point for the listing watcher CLI

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use listing_monitor::{
    FsSnapshotStore, HttpSourceAdapter, LogNotifier, SessionConfig, SessionRegistry,
    SharedAdapter, SourceAdapter,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Watch marketplace search keywords for new and discounted listings.
#[derive(Parser)]
#[command(name = "watcher", version)]
struct Args {
    /// Keywords to watch
    #[arg(required = true)]
    keywords: Vec<String>,

    /// Search URL template for the JSON endpoint; `{keyword}` is
    /// replaced with the percent-encoded keyword. Falls back to the
    /// WATCHER_SEARCH_URL environment variable.
    #[arg(long)]
    search_url: Option<String>,

    /// Minimum inter-poll delay in seconds
    #[arg(long, default_value_t = 30)]
    min_delay: u64,

    /// Maximum inter-poll delay in seconds
    #[arg(long, default_value_t = 300)]
    max_delay: u64,

    /// Directory holding per-keyword snapshot state
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let search_url = match args
        .search_url
        .or_else(|| std::env::var("WATCHER_SEARCH_URL").ok())
    {
        Some(url) => url,
        None => bail!("no search URL: pass --search-url or set WATCHER_SEARCH_URL"),
    };

    let adapter: Arc<dyn SourceAdapter> = Arc::new(HttpSourceAdapter::new(search_url));
    let registry = SessionRegistry::new(
        Arc::new(SharedAdapter(adapter)),
        Arc::new(FsSnapshotStore::new(&args.data_dir)),
        Arc::new(LogNotifier::new()),
    );

    for keyword in args.keywords {
        registry.register(keyword);
    }

    let config = SessionConfig::new(
        Duration::from_secs(args.min_delay),
        Duration::from_secs(args.max_delay),
    );
    let started = registry.start_all(config);
    tracing::info!(started, "watching; press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    tracing::info!("shutting down");
    registry.shutdown().await;

    Ok(())
}
