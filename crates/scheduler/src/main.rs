use anyhow::Result;
use common::Config;
use scheduler::IntervalScheduler;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tracker::Tracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    // Configure tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let tracker = Arc::new(Tracker::new(&config).await?);

    info!(
        "Watching {} feed(s) every {} minute(s), snapshots in {}",
        config.feeds.len(),
        config.poll_interval.as_secs() / 60,
        config.data_dir.display()
    );

    tracker.announce_startup().await;
    tracker.run_cycle().await;

    let mut scheduler = IntervalScheduler::new().await?;
    let job_tracker = Arc::clone(&tracker);
    scheduler
        .add_interval_job(config.poll_interval, move || {
            let tracker = Arc::clone(&job_tracker);
            async move {
                tracker.run_cycle().await;
            }
        })
        .await?;
    scheduler.start().await?;

    info!("Press Ctrl+C to stop the scheduler");
    tokio::signal::ctrl_c().await?;

    info!("Received interrupt signal, shutting down...");
    scheduler.shutdown().await?;

    Ok(())
}
