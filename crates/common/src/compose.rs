use serde_json::Value;
use tracing::debug;

use crate::feed::Feed;
use crate::notification::{EmbedField, ImageMessage, MessagePayload, Notification, TextMessage};

/// Maximum itemized lines in one notification body.
pub const MAX_ITEMIZED_LINES: usize = 10;

pub const FOOTER: &str = "Auto-update • Powered by Fortnite-API";

/// Incrementally assembles a [`Notification`].
///
/// Items beyond [`MAX_ITEMIZED_LINES`] are counted rather than rendered and
/// summarized by a single note at the end of the body. A section heading is
/// only written once one of its items is actually shown. Images past
/// `max_images` are dropped.
pub struct MessageBuilder {
    feed_id: String,
    title: String,
    lines: Vec<String>,
    pending_heading: Option<String>,
    itemized: usize,
    overflow: usize,
    fields: Vec<EmbedField>,
    images: Vec<ImageMessage>,
    max_images: usize,
    dropped_images: usize,
}

impl MessageBuilder {
    pub fn new(feed: &Feed, change_count: usize, max_images: usize) -> Self {
        Self {
            feed_id: feed.id.clone(),
            title: format!("🔔 Fortnite update: {}", feed.display_name),
            lines: vec![format!(
                "Detected **{}** change(s) in {}.",
                change_count, feed.display_name
            )],
            pending_heading: None,
            itemized: 0,
            overflow: 0,
            fields: Vec::new(),
            images: Vec::new(),
            max_images,
            dropped_images: 0,
        }
    }

    /// Starts a new section. The heading is written lazily with the first
    /// shown item.
    pub fn section(&mut self, heading: &str) {
        self.pending_heading = Some(heading.to_string());
    }

    /// Adds one itemized line. Returns false when the line was truncated.
    pub fn item(&mut self, label: &str) -> bool {
        if self.itemized >= MAX_ITEMIZED_LINES {
            self.overflow += 1;
            return false;
        }
        if let Some(heading) = self.pending_heading.take() {
            self.lines.push(String::new());
            self.lines.push(heading);
        }
        self.lines.push(format!("• {}", label));
        self.itemized += 1;
        true
    }

    /// Adds a free-form line that does not count toward the item cap.
    pub fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    pub fn field(&mut self, name: &str, value: &str, inline: bool) {
        self.fields.push(EmbedField {
            name: name.to_string(),
            value: value.to_string(),
            inline,
        });
    }

    pub fn image(&mut self, title: Option<&str>, url: &str) {
        if self.images.len() >= self.max_images {
            self.dropped_images += 1;
            return;
        }
        self.images.push(ImageMessage {
            title: title.map(str::to_string),
            url: url.to_string(),
        });
    }

    pub fn finish(mut self) -> Notification {
        if self.overflow > 0 {
            self.lines.push(format!(
                "…and {} more change(s) not shown.",
                self.overflow
            ));
        }
        if self.dropped_images > 0 {
            debug!(
                "Dropped {} image(s) for feed {} over the cap of {}",
                self.dropped_images, self.feed_id, self.max_images
            );
        }

        let mut payloads = vec![MessagePayload::Text(TextMessage {
            title: self.title,
            body: self.lines.join("\n"),
            fields: self.fields,
            footer: Some(FOOTER.to_string()),
        })];
        payloads.extend(self.images.into_iter().map(MessagePayload::Image));

        Notification {
            feed_id: self.feed_id,
            payloads,
        }
    }
}

/// First non-empty string among `keys` of a JSON object.
pub fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StrategyTag;
    use serde_json::json;

    fn feed() -> Feed {
        Feed::new("news", "News", "http://localhost/v2/news", StrategyTag::News)
    }

    fn itemized(notification: &Notification) -> Vec<String> {
        notification
            .text()
            .unwrap()
            .body
            .lines()
            .filter(|line| line.starts_with("• "))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn caps_items_and_summarizes_rest() {
        let mut builder = MessageBuilder::new(&feed(), 12, 5);
        for i in 0..12 {
            builder.item(&format!("entry {}", i));
        }
        let notification = builder.finish();

        assert_eq!(itemized(&notification).len(), MAX_ITEMIZED_LINES);
        assert!(notification
            .text()
            .unwrap()
            .body
            .ends_with("…and 2 more change(s) not shown."));
    }

    #[test]
    fn skips_headings_of_fully_truncated_sections() {
        let mut builder = MessageBuilder::new(&feed(), 11, 5);
        builder.section("First:");
        for i in 0..10 {
            builder.item(&format!("a{}", i));
        }
        builder.section("Second:");
        builder.item("b0");
        let body = builder.finish().text().unwrap().body.clone();

        assert!(body.contains("First:"));
        assert!(!body.contains("Second:"));
    }

    #[test]
    fn drops_images_past_cap() {
        let mut builder = MessageBuilder::new(&feed(), 1, 2);
        builder.item("x");
        for i in 0..4 {
            builder.image(None, &format!("https://img/{}", i));
        }
        let notification = builder.finish();

        assert_eq!(notification.images().count(), 2);
        assert!(matches!(notification.payloads[0], MessagePayload::Text(_)));
    }

    #[test]
    fn header_reports_count() {
        let notification = MessageBuilder::new(&feed(), 3, 0).finish();
        let text = notification.text().unwrap();
        assert_eq!(text.body, "Detected **3** change(s) in News.");
        assert_eq!(text.title, "🔔 Fortnite update: News");
    }

    #[test]
    fn first_str_skips_blank_values() {
        let value = json!({"name": "", "localizedName": "Solo", "id": "p1"});
        assert_eq!(first_str(&value, &["name", "localizedName", "id"]), Some("Solo"));
        assert_eq!(first_str(&value, &["missing"]), None);
    }
}
