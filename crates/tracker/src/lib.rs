pub mod registry;

use std::sync::Arc;

use common::{
    Config, DeliverySink, DiscordSink, Feed, FeedFetcher, FeedStrategy, SnapshotStore, StoreError,
    TrackerError, TrackerResult,
};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// What happened to one feed in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// First snapshot stored; nothing to compare against yet.
    ColdStart,
    Unchanged,
    Notified { changes: usize },
    /// Changes were found but the sink refused them. The snapshot still
    /// advanced.
    DeliveryFailed { changes: usize },
    /// The previous cycle for this feed was still running.
    Busy,
}

#[derive(Debug)]
pub struct FeedReport {
    pub feed_id: String,
    pub result: TrackerResult<FeedOutcome>,
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub feeds: Vec<FeedReport>,
}

impl CycleReport {
    pub fn outcome(&self, feed_id: &str) -> Option<&TrackerResult<FeedOutcome>> {
        self.feeds
            .iter()
            .find(|report| report.feed_id == feed_id)
            .map(|report| &report.result)
    }

    pub fn succeeded(&self) -> usize {
        self.feeds
            .iter()
            .filter(|r| matches!(r.result, Ok(outcome) if !matches!(outcome, FeedOutcome::DeliveryFailed { .. })))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.feeds.len() - self.succeeded()
    }
}

struct TrackedFeed {
    feed: Feed,
    strategy: Arc<dyn FeedStrategy>,
    in_flight: Arc<Mutex<()>>,
}

/// Runs the fetch → diff → compose → deliver → save pipeline for every
/// configured feed.
pub struct Tracker {
    feeds: Vec<Arc<TrackedFeed>>,
    fetcher: FeedFetcher,
    store: SnapshotStore,
    sink: Arc<dyn DeliverySink>,
}

impl Tracker {
    pub async fn new(config: &Config) -> TrackerResult<Self> {
        let fetcher = FeedFetcher::new(&config.api).map_err(|e| TrackerError::Config(e.into()))?;
        let sink = DiscordSink::new(&config.discord).map_err(|e| TrackerError::Config(e.into()))?;
        let store = SnapshotStore::open(config.data_dir.clone()).await?;

        Ok(Self::with_parts(config.feeds.clone(), fetcher, store, Arc::new(sink)))
    }

    pub fn with_parts(
        feeds: Vec<Feed>,
        fetcher: FeedFetcher,
        store: SnapshotStore,
        sink: Arc<dyn DeliverySink>,
    ) -> Self {
        let feeds = feeds
            .into_iter()
            .map(|feed| {
                Arc::new(TrackedFeed {
                    strategy: registry::strategy_for(feed.strategy),
                    feed,
                    in_flight: Arc::new(Mutex::new(())),
                })
            })
            .collect();

        Self {
            feeds,
            fetcher,
            store,
            sink,
        }
    }

    pub fn feeds(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.iter().map(|tracked| &tracked.feed)
    }

    /// Tells the channel the tracker is up. Failures are only logged.
    pub async fn announce_startup(&self) {
        let names: Vec<_> = self.feeds().map(|feed| feed.display_name.as_str()).collect();
        let text = format!("✅ Fortnite tracker is running. Watching: {}.", names.join(", "));
        if let Err(e) = self.sink.announce(&text).await {
            warn!("Startup announcement failed: {}", e);
        }
    }

    /// Processes every feed concurrently. A failing feed never affects its
    /// siblings; every outcome is logged and returned.
    pub async fn run_cycle(self: &Arc<Self>) -> CycleReport {
        let mut tasks = JoinSet::new();

        for tracked in &self.feeds {
            let tracker = Arc::clone(self);
            let tracked = Arc::clone(tracked);
            tasks.spawn(async move {
                let feed_id = tracked.feed.id.clone();
                let result = tracker.process_feed(&tracked).await;
                match &result {
                    Ok(outcome) => info!("Feed {} finished: {:?}", feed_id, outcome),
                    Err(e) => warn!("Feed {} failed: {}", feed_id, e),
                }
                FeedReport { feed_id, result }
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("Feed task failed: {}", e);
                    reports.push(FeedReport {
                        feed_id: "unknown".to_string(),
                        result: Err(TrackerError::Task(e.to_string())),
                    });
                }
            }
        }
        reports.sort_by_key(|report| {
            self.feeds
                .iter()
                .position(|tracked| tracked.feed.id == report.feed_id)
                .unwrap_or(usize::MAX)
        });

        let report = CycleReport { feeds: reports };
        info!(
            "Cycle finished. Successful: {}, Failed: {}",
            report.succeeded(),
            report.failed()
        );
        report
    }

    async fn process_feed(&self, tracked: &TrackedFeed) -> TrackerResult<FeedOutcome> {
        let Ok(_in_flight) = Arc::clone(&tracked.in_flight).try_lock_owned() else {
            info!("Feed {} is still being processed; skipping this tick", tracked.feed.id);
            return Ok(FeedOutcome::Busy);
        };
        let feed = &tracked.feed;

        let previous = match self.store.load(&feed.id).await {
            Ok(previous) => previous,
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!("{}; storing a fresh baseline", e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let current = self.fetcher.fetch(feed).await?;

        let Some(previous) = previous else {
            self.store.save(&feed.id, &current).await?;
            info!("Stored first snapshot for {}; not notifying", feed.id);
            return Ok(FeedOutcome::ColdStart);
        };

        let changes = tracked.strategy.diff(&previous, &current);
        if changes.is_empty() {
            self.store.save(&feed.id, &current).await?;
            return Ok(FeedOutcome::Unchanged);
        }
        info!("Detected {} change(s) in {}", changes.len(), feed.id);

        let notification = tracked.strategy.compose(feed, &changes, &current);
        let outcome = match self.sink.deliver(&notification).await {
            Ok(()) => FeedOutcome::Notified { changes: changes.len() },
            Err(source) => {
                let err = TrackerError::Delivery {
                    feed_id: feed.id.clone(),
                    source,
                };
                warn!("{}; snapshot will still be updated", err);
                FeedOutcome::DeliveryFailed { changes: changes.len() }
            }
        };

        self.store.save(&feed.id, &current).await?;
        Ok(outcome)
    }
}
