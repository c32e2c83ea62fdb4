use common::compose::first_str;
use common::entity::{diff_section, Track};
use common::{generic, ChangeRecord, Document, Feed, FeedStrategy, MessageBuilder, Notification};

const SECTION: &str = "playlists";
const MAX_IMAGES: usize = 8;

/// Newly listed playlists, keyed by `id`, `playlistId` or `name`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaylistsStrategy;

impl PlaylistsStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl FeedStrategy for PlaylistsStrategy {
    fn name(&self) -> &'static str {
        "playlists"
    }

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord> {
        match (old.as_array(), new.as_array()) {
            (Some(old_items), Some(new_items)) => diff_section(
                SECTION,
                old_items,
                new_items,
                &["id", "playlistId", "name"],
                Track::Added,
            ),
            _ => generic::whole_document(old, new),
        }
    }

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], _new: &Document) -> Notification {
        if common::change::is_whole_document(changes) {
            return generic::compose(feed, changes);
        }

        let mut builder = MessageBuilder::new(feed, changes.len(), MAX_IMAGES);
        builder.section("New playlists:");
        for change in changes {
            let playlist = change.subject();
            let title = first_str(playlist, &["name", "localizedName"]).unwrap_or(&change.path().key);
            builder.item(title);

            if let Some(url) = playlist
                .get("images")
                .and_then(|images| first_str(images, &["showcase", "missionIcon"]))
            {
                builder.image(Some(title), url);
            }
        }
        builder.finish()
    }
}
