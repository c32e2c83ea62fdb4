use std::sync::Arc;

use anyhow::Result;
use common::Config;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tracker::Tracker;

/// Runs a single check of every configured feed and exits.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let tracker = Arc::new(Tracker::new(&config).await?);

    info!("Checking {} feed(s) once", config.feeds.len());
    let report = tracker.run_cycle().await;

    if report.failed() > 0 {
        anyhow::bail!("{} feed(s) failed to complete successfully", report.failed());
    }

    Ok(())
}
