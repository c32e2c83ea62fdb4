use common::compose::first_str;
use common::entity::{diff_section, list_at, Track};
use common::{generic, ChangePath, ChangeRecord, Document, Feed, FeedStrategy, MessageBuilder, Notification};
use serde_json::Value;

const POIS: &str = "pois";
const IMAGES: &str = "images";
const MAX_IMAGES: usize = 8;

/// Points of interest keyed by `id` (or `name`), plus the map image set.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapStrategy;

impl MapStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// Missing and null both count as an empty image set.
fn images(doc: &Document) -> Value {
    match doc.get(IMAGES) {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value.clone(),
    }
}

impl FeedStrategy for MapStrategy {
    fn name(&self) -> &'static str {
        "map"
    }

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord> {
        let (Some(old_pois), Some(new_pois)) = (list_at(old, "/pois"), list_at(new, "/pois")) else {
            return generic::whole_document(old, new);
        };
        if !old.is_object() || !new.is_object() {
            return generic::whole_document(old, new);
        }

        let mut changes = diff_section(POIS, old_pois, new_pois, &["id", "name"], Track::AddedAndRemoved);

        let (old_images, new_images) = (images(old), images(new));
        if old_images != new_images {
            changes.push(ChangeRecord::changed(ChangePath::key(IMAGES), old_images, new_images));
        }
        changes
    }

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], new: &Document) -> Notification {
        if common::change::is_whole_document(changes) {
            return generic::compose(feed, changes);
        }

        let mut builder = MessageBuilder::new(feed, changes.len(), MAX_IMAGES);

        if changes.iter().any(|c| c.path() == &ChangePath::key(IMAGES)) {
            builder.item("Map images were updated.");
        }

        builder.section("Added points of interest:");
        for change in changes.iter().filter(|c| is_poi(c) && matches!(c, ChangeRecord::Added { .. })) {
            builder.item(&poi_label(change));
        }

        builder.section("Removed points of interest:");
        for change in changes.iter().filter(|c| is_poi(c) && matches!(c, ChangeRecord::Removed { .. })) {
            builder.item(&poi_label(change));
        }

        builder.line("");
        builder.line("🗺️ The map was updated; the next message shows the new layout.");

        if let Some(url) = new
            .get(IMAGES)
            .and_then(|images| first_str(images, &["pois", "map", "blank"]))
        {
            builder.image(None, url);
        }

        builder.finish()
    }
}

fn is_poi(change: &ChangeRecord) -> bool {
    change.path().in_section(POIS)
}

fn poi_label(change: &ChangeRecord) -> String {
    first_str(change.subject(), &["name"])
        .unwrap_or(&change.path().key)
        .to_string()
}
