//! Stock threshold watcher daemon.
//!
//! Sweeps stock levels on an interval and logs low-stock and expired-lot
//! alerts. The watcher only reads; it never blocks or mutates the engine.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockbook_db::events::{self, ThresholdWatcher};
use stockbook_db::repositories::StockRepository;
use stockbook_shared::AppConfig;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockbook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = stockbook_db::connect(&config.database.url).await?;
    info!("Connected to database");

    info!(
        threshold = %config.policy.low_stock_threshold,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Watcher starting"
    );

    let (events, rx) = events::channel(EVENT_BUFFER);
    let watcher = ThresholdWatcher::new(
        StockRepository::new(db),
        config.policy.clone(),
        events,
        SWEEP_INTERVAL,
    );

    // Both sides run until the process is stopped.
    tokio::join!(watcher.run(), events::process_events(rx));

    Ok(())
}
