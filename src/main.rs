use std::sync::Arc;
use std::sync::atomic::Ordering;

use watch_relay::config::Config;
use watch_relay::feed::{FeedSource, RedditFeed};
use watch_relay::relay::{Relay, RelayDeps, SeenLedger, SubscriberRegistry};
use watch_relay::store::{FsStore, KVStore};
use watch_relay::transport::{TelegramTransport, Transport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read bot token from environment
    let telegram_token = std::env::var("TELEGRAM_TOKEN").unwrap_or_else(|_| {
        eprintln!("Error: TELEGRAM_TOKEN not set");
        eprintln!("  export TELEGRAM_TOKEN=123456:ABC-DEF...");
        std::process::exit(1);
    });

    let config = Config::from_env()?;

    eprintln!("🕵️ Watch Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Feed: {}", config.feed_url);
    eprintln!("   Feed poll: every {}s", config.feed_poll_interval.as_secs());
    eprintln!("   Command poll: every {}s", config.command_poll_interval.as_secs());
    eprintln!("   Data dir: {}", config.data_dir.display());

    // ── State ────────────────────────────────────────────────────────────
    let store: Arc<dyn KVStore> = Arc::new(FsStore::new(config.data_dir.clone()));
    let ledger = SeenLedger::load(Arc::clone(&store)).await;
    let registry = SubscriberRegistry::load(Arc::clone(&store)).await;
    eprintln!("   Seen items: {}", ledger.len());
    eprintln!("   Subscribers: {}\n", registry.len());

    // ── Adapters ─────────────────────────────────────────────────────────
    let feed: Arc<dyn FeedSource> = Arc::new(RedditFeed::new());
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(
        secrecy::SecretString::from(telegram_token),
    ));

    let relay = Relay::new(
        config,
        RelayDeps {
            feed,
            transport,
            ledger,
            registry,
        },
    );

    // Ctrl-C flips the shutdown flag; the loop notices at its next tick.
    let shutdown = relay.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    relay.run().await;

    Ok(())
}
