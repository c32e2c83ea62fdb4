use crate::change::ChangeRecord;
use crate::feed::{Document, Feed};
use crate::notification::Notification;

/// Per-feed diff and compose behaviour.
///
/// `diff` must never fail: payloads of an unexpected shape fall back to
/// whole-document equality. `compose` is only called with a non-empty change
/// list and must not perform I/O.
pub trait FeedStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord>;

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], new: &Document) -> Notification;
}
