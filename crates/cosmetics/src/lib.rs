pub mod models;

use common::entity::{diff_section, Track};
use common::{generic, ChangeRecord, Document, Feed, FeedStrategy, MessageBuilder, Notification};
use models::Cosmetic;
use tracing::debug;

const SECTION: &str = "outfits";
const MAX_IMAGES: usize = 10;

/// Newly added outfits in the cosmetics catalog. Other cosmetic types and
/// removals are not reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct CosmeticsStrategy;

impl CosmeticsStrategy {
    pub fn new() -> Self {
        Self
    }
}

fn is_outfit(change: &ChangeRecord) -> bool {
    Cosmetic::from_value(change.subject()).is_outfit()
}

impl FeedStrategy for CosmeticsStrategy {
    fn name(&self) -> &'static str {
        "cosmetics"
    }

    fn diff(&self, old: &Document, new: &Document) -> Vec<ChangeRecord> {
        let (Some(old_items), Some(new_items)) = (old.as_array(), new.as_array()) else {
            return generic::whole_document(old, new);
        };

        let added = diff_section(SECTION, old_items, new_items, &["id"], Track::Added);
        let total = added.len();
        let outfits: Vec<_> = added.into_iter().filter(is_outfit).collect();
        debug!("{} new cosmetic(s), {} of them outfits", total, outfits.len());
        outfits
    }

    fn compose(&self, feed: &Feed, changes: &[ChangeRecord], _new: &Document) -> Notification {
        if common::change::is_whole_document(changes) {
            return generic::compose(feed, changes);
        }

        let cosmetics: Vec<Cosmetic> = changes
            .iter()
            .map(|change| Cosmetic::from_value(change.subject()))
            .collect();

        let mut builder = MessageBuilder::new(feed, changes.len(), MAX_IMAGES);
        builder.section("New outfits:");
        for cosmetic in &cosmetics {
            builder.item(&cosmetic.label());
        }
        for cosmetic in &cosmetics {
            if let Some(url) = cosmetic.image_url() {
                builder.image(Some(cosmetic.display_name()), url);
            }
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ChangePath, StrategyTag};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn feed() -> Feed {
        Feed::new("cosmetics", "Cosmetics", "http://localhost/v2/cosmetics/br", StrategyTag::Cosmetics)
    }

    fn outfit(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "type": {"value": "outfit", "displayValue": "Outfit"},
            "rarity": {"value": "epic", "displayValue": "Epic"},
            "images": {"smallIcon": format!("https://img/{}-small.png", id), "icon": format!("https://img/{}.png", id)}
        })
    }

    #[test]
    fn only_new_outfits_count() {
        let old = json!([outfit("CID_001", "Jonesy")]);
        let new = json!([
            outfit("CID_001", "Jonesy"),
            outfit("CID_777", "Peely"),
            {"id": "Pickaxe_1", "name": "Axe", "type": {"value": "pickaxe"}},
            {"id": "CID_LEGACY", "name": "Raven", "type": "Character"}
        ]);

        let changes = CosmeticsStrategy.diff(&old, &new);
        let paths: Vec<_> = changes.iter().map(|c| c.path().clone()).collect();
        assert_eq!(
            paths,
            vec![ChangePath::entity("outfits", "CID_777"), ChangePath::entity("outfits", "CID_LEGACY")]
        );

        let notification = CosmeticsStrategy.compose(&feed(), &changes, &new);
        let body = &notification.text().unwrap().body;
        assert!(body.starts_with("Detected **2** change(s) in Cosmetics."));
        assert!(body.contains("New outfits:\n• Peely (Epic)\n• Raven"));

        let images: Vec<_> = notification.images().collect();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://img/CID_777.png");
        assert_eq!(images[0].title.as_deref(), Some("Peely"));
    }

    #[test]
    fn non_outfit_additions_produce_no_changes() {
        let old = json!([]);
        let new = json!([{"id": "EID_Dance", "name": "Floss", "type": {"value": "emote"}}]);
        assert!(CosmeticsStrategy.diff(&old, &new).is_empty());
    }

    #[test]
    fn one_new_entity_one_record() {
        let old: Vec<Value> = (0..5).map(|i| outfit(&format!("CID_{}", i), "Old")).collect();
        let mut new = old.clone();
        new.push(outfit("CID_NEW", "Fresh"));

        let changes = CosmeticsStrategy.diff(&Value::Array(old), &Value::Array(new));
        assert_eq!(
            changes,
            vec![ChangeRecord::added(ChangePath::entity("outfits", "CID_NEW"), outfit("CID_NEW", "Fresh"))]
        );
    }

    #[test]
    fn caps_images_at_ten() {
        let new: Vec<Value> = (0..12).map(|i| outfit(&format!("CID_{}", i), "Skin")).collect();
        let new = Value::Array(new);
        let changes = CosmeticsStrategy.diff(&json!([]), &new);
        let notification = CosmeticsStrategy.compose(&feed(), &changes, &new);
        assert_eq!(notification.images().count(), 10);
    }

    #[test]
    fn odd_field_shapes_still_count_as_outfits() {
        let new = json!([
            {"id": "CID_A", "type": {"value": "outfit"}, "rarity": "Epic"},
            {"id": "CID_B", "type": {"value": "outfit"}, "images": {"icon": 5}},
            {"id": "CID_C", "name": {"en": "Raven"}, "type": {"value": "outfit"}}
        ]);

        let changes = CosmeticsStrategy.diff(&json!([]), &new);
        assert_eq!(changes.len(), 3);

        let notification = CosmeticsStrategy.compose(&feed(), &changes, &new);
        let items: Vec<_> = notification
            .text()
            .unwrap()
            .body
            .lines()
            .filter(|line| line.starts_with("• "))
            .collect();
        assert_eq!(items, vec!["• New outfit", "• New outfit", "• New outfit"]);
        assert_eq!(notification.images().count(), 0);
    }
}
