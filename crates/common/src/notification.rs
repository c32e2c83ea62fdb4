#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub title: String,
    pub body: String,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMessage {
    pub title: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text(TextMessage),
    Image(ImageMessage),
}

/// Everything one feed wants to say in one cycle: a text payload first,
/// followed by any image payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub feed_id: String,
    pub payloads: Vec<MessagePayload>,
}

impl Notification {
    pub fn text(&self) -> Option<&TextMessage> {
        self.payloads.iter().find_map(|payload| match payload {
            MessagePayload::Text(text) => Some(text),
            MessagePayload::Image(_) => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageMessage> {
        self.payloads.iter().filter_map(|payload| match payload {
            MessagePayload::Image(image) => Some(image),
            MessagePayload::Text(_) => None,
        })
    }
}
