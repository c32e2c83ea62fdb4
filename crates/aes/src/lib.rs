pub mod models;

use common::{generic, ChangePath, ChangeRecord, Document, Feed, FeedStrategy, MessageBuilder, Notification};
use models::DynamicKey;
use serde_json::Value;

const BUILD: &str = "build";
const MAIN_KEY: &str = "mainKey";
const DYNAMIC_KEYS: &str = "dynamicKeys";
const UPDATED: &str = "updated";
const TRACKED_FIELDS: [&str; 4] = [BUILD, MAIN_KEY, DYNAMIC_KEYS, UPDATED];
const MAX_LISTED_DYNAMIC_KEYS: usize = 5;

/// Field-level comparison of the AES key payload. Each differing field
/// among build, main key, dynamic keys and update time is one change; any
/// other field is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct AesStrategy;

impl AesStrategy {
    pub fn new() -> Self {
        Self
    }
}

fn field(doc: &Value, name: &str) -> Value {
    match doc.get(name) {
        Some(Value::Null) | None if name == DYNAMIC_KEYS => Value::Array(Vec::new()),
        Some(value) => value.clone(),
        None => Value::Null,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FeedStrategy for AesStrategy {
    fn name(&self) -> &'static str {
        "aes"
    }

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord> {
        if !old.is_object() || !new.is_object() {
            return generic::whole_document(old, new);
        }

        TRACKED_FIELDS
            .iter()
            .filter_map(|name| {
                let (old_value, new_value) = (field(old, name), field(new, name));
                (old_value != new_value)
                    .then(|| ChangeRecord::changed(ChangePath::key(name), old_value, new_value))
            })
            .collect()
    }

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], new: &Document) -> Notification {
        if common::change::is_whole_document(changes) {
            return generic::compose(feed, changes);
        }

        let mut builder = MessageBuilder::new(feed, changes.len(), 0);
        for change in changes {
            let value = change.subject();
            match change.path().key.as_str() {
                BUILD if value.is_null() => {
                    builder.item("Build was removed.");
                }
                BUILD => {
                    builder.item(&format!("Build: `{}`", scalar(value)));
                }
                MAIN_KEY if value.is_null() => {
                    builder.item("Main key was removed.");
                }
                MAIN_KEY => {
                    builder.item(&format!("Main key: `{}`", scalar(value)));
                }
                DYNAMIC_KEYS => {
                    let keys = DynamicKey::list_from(value);
                    let shown = builder.item(&format!("Dynamic keys updated, current count: **{}**", keys.len()));
                    if shown {
                        for key in keys.iter().take(MAX_LISTED_DYNAMIC_KEYS) {
                            builder.line(&format!("  {}", key.describe()));
                        }
                    }
                }
                // Counted in the header only.
                UPDATED if value.is_null() => {}
                UPDATED => {
                    builder.item(&format!("Last updated: `{}`", scalar(value)));
                }
                other => {
                    builder.item(&format!("{}: {}", change.kind(), other));
                }
            }
        }

        if let Some(build) = new.get(BUILD).filter(|v| !v.is_null()) {
            builder.field("Build", &scalar(build), true);
        }
        builder.field(
            "Dynamic keys",
            &DynamicKey::list_from(&field(new, DYNAMIC_KEYS)).len().to_string(),
            true,
        );

        builder.finish()
    }
}
