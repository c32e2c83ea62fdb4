//! Shallow top-level diffing, the default for feeds without an extractor.

use crate::change::{ChangePath, ChangeRecord};
use crate::compose::MessageBuilder;
use crate::feed::{Document, Feed};
use crate::notification::Notification;
use crate::strategy::FeedStrategy;

/// Compares two documents key by key at the top level.
///
/// Additions and changes come first, in the new document's key order,
/// followed by removals in the old document's key order. Non-object inputs
/// are compared as whole documents.
pub fn diff(old: &Document, new: &Document) -> Vec<ChangeRecord> {
    let (Some(old_map), Some(new_map)) = (old.as_object(), new.as_object()) else {
        return whole_document(old, new);
    };

    let mut changes = Vec::new();
    for (key, new_value) in new_map {
        match old_map.get(key) {
            None => changes.push(ChangeRecord::added(ChangePath::key(key), new_value.clone())),
            Some(old_value) if old_value != new_value => changes.push(ChangeRecord::changed(
                ChangePath::key(key),
                old_value.clone(),
                new_value.clone(),
            )),
            Some(_) => {}
        }
    }
    for (key, old_value) in old_map {
        if !new_map.contains_key(key) {
            changes.push(ChangeRecord::removed(ChangePath::key(key), old_value.clone()));
        }
    }
    changes
}

/// Single root-level `Changed` when the documents differ, nothing otherwise.
pub fn whole_document(old: &Document, new: &Document) -> Vec<ChangeRecord> {
    if old == new {
        Vec::new()
    } else {
        vec![ChangeRecord::changed(ChangePath::root(), old.clone(), new.clone())]
    }
}

pub fn compose(feed: &Feed, changes: &[ChangeRecord]) -> Notification {
    let mut builder = MessageBuilder::new(feed, changes.len(), 0);
    for change in changes {
        let path = change.path();
        let label = if path.is_root() {
            "entire document".to_string()
        } else {
            path.to_string()
        };
        builder.item(&format!("{}: {}", change.kind(), label));
    }
    builder.finish()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GenericStrategy;

impl FeedStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord> {
        diff(old, new)
    }

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], _new: &Document) -> Notification {
        compose(feed, changes)
    }
}
