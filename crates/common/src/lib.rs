pub mod change;
pub mod compose;
pub mod config;
pub mod delivery;
pub mod entity;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod generic;
pub mod notification;
pub mod store;
pub mod strategy;

pub use change::{ChangeKind, ChangePath, ChangeRecord};
pub use compose::MessageBuilder;
pub use config::Config;
pub use delivery::{DeliverySink, DiscordSink};
pub use error::{DeliveryError, FetchCause, FetchError, StoreError, TrackerError, TrackerResult};
pub use feed::{Document, Feed, KnownFeed, StrategyTag};
pub use fetcher::FeedFetcher;
pub use generic::GenericStrategy;
pub use notification::{ImageMessage, MessagePayload, Notification, TextMessage};
pub use store::SnapshotStore;
pub use strategy::FeedStrategy;
