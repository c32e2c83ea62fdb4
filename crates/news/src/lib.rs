use common::compose::first_str;
use common::entity::{diff_section, list_at, Track};
use common::{generic, ChangeRecord, Document, Feed, FeedStrategy, MessageBuilder, Notification};
use serde_json::Value;

const MAX_IMAGES: usize = 10;
const ID_FIELDS: [&str; 2] = ["id", "title"];

/// A message list inside the news payload.
struct Section {
    key: &'static str,
    heading: &'static str,
}

const SECTIONS: [Section; 2] = [
    Section {
        key: "br",
        heading: "New Battle Royale news:",
    },
    Section {
        key: "stw",
        heading: "New Save the World news:",
    },
];

/// Battle Royale message-of-the-day entries and Save the World messages,
/// diffed independently. Only additions are reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewsStrategy;

impl NewsStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// The message list of one section. STW news lives under `messages`, older
/// payloads carry it under `alerts`.
fn messages<'a>(doc: &'a Value, section: &str) -> Option<&'a [Value]> {
    match section {
        "br" => list_at(doc, "/br/motds"),
        _ => {
            let messages = list_at(doc, "/stw/messages")?;
            if messages.is_empty() {
                list_at(doc, "/stw/alerts")
            } else {
                Some(messages)
            }
        }
    }
}

impl FeedStrategy for NewsStrategy {
    fn name(&self) -> &'static str {
        "news"
    }

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord> {
        if !old.is_object() || !new.is_object() {
            return generic::whole_document(old, new);
        }

        let mut changes = Vec::new();
        for section in &SECTIONS {
            let (Some(old_items), Some(new_items)) = (messages(old, section.key), messages(new, section.key)) else {
                return generic::whole_document(old, new);
            };
            changes.extend(diff_section(section.key, old_items, new_items, &ID_FIELDS, Track::Added));
        }
        changes
    }

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], _new: &Document) -> Notification {
        if common::change::is_whole_document(changes) {
            return generic::compose(feed, changes);
        }

        let mut builder = MessageBuilder::new(feed, changes.len(), MAX_IMAGES);
        for section in &SECTIONS {
            builder.section(section.heading);
            for change in changes.iter().filter(|c| c.path().in_section(section.key)) {
                builder.item(first_str(change.subject(), &["title"]).unwrap_or("Untitled news"));
            }
        }

        if let Some(highlight) = changes.first().map(ChangeRecord::subject) {
            let title = first_str(highlight, &["title"]);
            let body = first_str(highlight, &["body", "message"]);
            if title.is_some() || body.is_some() {
                builder.line("");
                builder.line("📰");
                if let Some(title) = title {
                    builder.line(&format!("**{}**", title));
                }
                if let Some(body) = body {
                    builder.line(body);
                }
            }
        }

        for change in changes {
            if let Some(url) = first_str(change.subject(), &["image"]) {
                builder.image(first_str(change.subject(), &["title"]), url);
            }
        }

        builder.finish()
    }
}
