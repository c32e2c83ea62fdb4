use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::config::FortniteApiConfig;
use common::{
    DeliveryError, DeliverySink, FeedFetcher, FetchCause, KnownFeed, MessagePayload, Notification,
    SnapshotStore, TrackerError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use tracker::{FeedOutcome, Tracker};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
    reject: bool,
}

impl RecordingSink {
    fn rejecting() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if self.reject {
            return Err(DeliveryError::Timeout);
        }
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn announce(&self, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}

struct Harness {
    server: MockServer,
    dir: TempDir,
    store: SnapshotStore,
    sink: Arc<RecordingSink>,
    tracker: Arc<Tracker>,
}

async fn harness(feeds: &[KnownFeed], sink: RecordingSink, fetch_timeout: Duration) -> Harness {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();
    let sink = Arc::new(sink);

    let fetcher = FeedFetcher::new(&FortniteApiConfig {
        base_url: server.uri(),
        api_key: None,
        language: None,
        timeout: fetch_timeout,
    })
    .unwrap();
    let feeds = feeds.iter().map(|feed| feed.to_feed(&server.uri())).collect();
    let tracker = Arc::new(Tracker::with_parts(feeds, fetcher, store.clone(), sink.clone()));

    Harness {
        server,
        dir,
        store,
        sink,
        tracker,
    }
}

async fn serve(server: &MockServer, feed: KnownFeed, data: Value) {
    Mock::given(method("GET"))
        .and(path(feed.path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200, "data": data})))
        .mount(server)
        .await;
}

fn old_map() -> Value {
    json!({"pois": [{"id": "a", "name": "Lake"}], "images": {"pois": "url1"}})
}

fn new_map() -> Value {
    json!({
        "pois": [{"id": "a", "name": "Lake"}, {"id": "b", "name": "Castle"}],
        "images": {"pois": "url2"}
    })
}

#[tokio::test]
async fn cold_start_stores_without_notifying() {
    let h = harness(&[KnownFeed::Map], RecordingSink::default(), Duration::from_secs(5)).await;
    serve(&h.server, KnownFeed::Map, new_map()).await;

    let report = h.tracker.run_cycle().await;

    assert!(matches!(report.outcome("map"), Some(Ok(FeedOutcome::ColdStart))));
    assert!(h.sink.delivered().is_empty());
    assert_eq!(h.store.load("map").await.unwrap(), Some(new_map()));
}

#[tokio::test]
async fn map_update_notifies_with_image() {
    let h = harness(&[KnownFeed::Map], RecordingSink::default(), Duration::from_secs(5)).await;
    h.store.save("map", &old_map()).await.unwrap();
    serve(&h.server, KnownFeed::Map, new_map()).await;

    let report = h.tracker.run_cycle().await;
    assert!(matches!(
        report.outcome("map"),
        Some(Ok(FeedOutcome::Notified { changes: 2 }))
    ));

    let delivered = h.sink.delivered();
    assert_eq!(delivered.len(), 1);
    let notification = &delivered[0];
    assert_eq!(notification.feed_id, "map");

    let text = notification.text().unwrap();
    assert!(text.body.contains("**2**"));
    assert!(text.body.contains("Added points of interest:\n• Castle"));
    assert!(matches!(
        &notification.payloads[1],
        MessagePayload::Image(image) if image.url == "url2"
    ));

    assert_eq!(h.store.load("map").await.unwrap(), Some(new_map()));
}

#[tokio::test]
async fn unchanged_feed_stays_silent() {
    let h = harness(&[KnownFeed::Shop], RecordingSink::default(), Duration::from_secs(5)).await;
    let shop = json!({"hash": "abc", "entries": []});
    h.store.save("shop", &shop).await.unwrap();
    serve(&h.server, KnownFeed::Shop, shop.clone()).await;

    let report = h.tracker.run_cycle().await;

    assert!(matches!(report.outcome("shop"), Some(Ok(FeedOutcome::Unchanged))));
    assert!(h.sink.delivered().is_empty());
}

#[tokio::test]
async fn slow_feed_does_not_block_siblings() {
    let h = harness(
        &[KnownFeed::Map, KnownFeed::News],
        RecordingSink::default(),
        Duration::from_millis(300),
    )
    .await;
    h.store.save("map", &old_map()).await.unwrap();
    h.store
        .save("news", &json!({"br": {"motds": []}}))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path(KnownFeed::Map.path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": new_map()}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&h.server)
        .await;
    let news = json!({"br": {"motds": [{"id": "n1", "title": "Chapter 6"}]}});
    serve(&h.server, KnownFeed::News, news.clone()).await;

    let report = h.tracker.run_cycle().await;

    assert!(matches!(
        report.outcome("map"),
        Some(Err(TrackerError::Fetch(e))) if matches!(e.cause, FetchCause::Timeout)
    ));
    assert!(matches!(
        report.outcome("news"),
        Some(Ok(FeedOutcome::Notified { changes: 1 }))
    ));
    assert_eq!(report.failed(), 1);

    let delivered = h.sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].feed_id, "news");
    assert_eq!(h.store.load("news").await.unwrap(), Some(news));
    assert_eq!(h.store.load("map").await.unwrap(), Some(old_map()));
}

#[tokio::test]
async fn failed_delivery_still_advances_snapshot() {
    let h = harness(&[KnownFeed::Map], RecordingSink::rejecting(), Duration::from_secs(5)).await;
    h.store.save("map", &old_map()).await.unwrap();
    serve(&h.server, KnownFeed::Map, new_map()).await;

    let report = h.tracker.run_cycle().await;

    assert!(matches!(
        report.outcome("map"),
        Some(Ok(FeedOutcome::DeliveryFailed { changes: 2 }))
    ));
    assert_eq!(report.failed(), 1);
    assert_eq!(h.store.load("map").await.unwrap(), Some(new_map()));
}

#[tokio::test]
async fn empty_payload_leaves_snapshot_alone() {
    let h = harness(&[KnownFeed::Aes], RecordingSink::default(), Duration::from_secs(5)).await;
    let aes = json!({"build": "1", "mainKey": "0x1"});
    h.store.save("aes", &aes).await.unwrap();
    Mock::given(method("GET"))
        .and(path(KnownFeed::Aes.path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
        .mount(&h.server)
        .await;

    let report = h.tracker.run_cycle().await;

    assert!(matches!(
        report.outcome("aes"),
        Some(Err(TrackerError::Fetch(e))) if matches!(e.cause, FetchCause::EmptyPayload)
    ));
    assert_eq!(h.store.load("aes").await.unwrap(), Some(aes));
}

#[tokio::test]
async fn corrupt_snapshot_is_rebaselined() {
    let h = harness(&[KnownFeed::Playlists], RecordingSink::default(), Duration::from_secs(5)).await;
    std::fs::write(h.dir.path().join("playlists.json"), b"{oops").unwrap();
    let playlists = json!([{"id": "Playlist_Solo", "name": "Solo"}]);
    serve(&h.server, KnownFeed::Playlists, playlists.clone()).await;

    let report = h.tracker.run_cycle().await;

    assert!(matches!(report.outcome("playlists"), Some(Ok(FeedOutcome::ColdStart))));
    assert!(h.sink.delivered().is_empty());
    assert_eq!(h.store.load("playlists").await.unwrap(), Some(playlists));
}

#[tokio::test]
async fn second_cycle_notifies_after_cold_start() {
    let h = harness(&[KnownFeed::Cosmetics], RecordingSink::default(), Duration::from_secs(5)).await;
    let outfit = |id: &str, name: &str| json!({"id": id, "name": name, "type": {"value": "outfit"}});
    serve(&h.server, KnownFeed::Cosmetics, json!([outfit("CID_1", "Jonesy")])).await;
    h.tracker.run_cycle().await;

    h.server.reset().await;
    serve(
        &h.server,
        KnownFeed::Cosmetics,
        json!([outfit("CID_1", "Jonesy"), outfit("CID_2", "Peely")]),
    )
    .await;
    let report = h.tracker.run_cycle().await;

    assert!(matches!(
        report.outcome("cosmetics"),
        Some(Ok(FeedOutcome::Notified { changes: 1 }))
    ));
    let delivered = h.sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].text().unwrap().body.contains("• Peely"));
}

#[tokio::test]
async fn overlapping_cycles_skip_busy_feed() {
    let h = harness(&[KnownFeed::Map], RecordingSink::default(), Duration::from_secs(5)).await;
    Mock::given(method("GET"))
        .and(path(KnownFeed::Map.path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": new_map()}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&h.server)
        .await;

    let (first, second) = tokio::join!(h.tracker.run_cycle(), h.tracker.run_cycle());
    let outcomes: Vec<FeedOutcome> = [first, second]
        .iter()
        .filter_map(|report| match report.outcome("map") {
            Some(Ok(outcome)) => Some(*outcome),
            _ => None,
        })
        .collect();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.contains(&FeedOutcome::Busy));
    assert!(outcomes.contains(&FeedOutcome::ColdStart));
}
