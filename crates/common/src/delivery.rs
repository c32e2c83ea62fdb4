use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::DiscordConfig;
use crate::error::DeliveryError;
use crate::notification::{MessagePayload, Notification};

const MAX_DESCRIPTION_CHARS: usize = 4096;
const MAX_TITLE_CHARS: usize = 256;
const MAX_RATE_LIMIT_RETRIES: usize = 5;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Receives composed notifications, e.g. a chat channel.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;

    /// Plain one-off message such as a startup notice.
    async fn announce(&self, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Serialize)]
struct EmbedImage<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct Footer<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Field<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Default, Serialize)]
struct Embed<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<Field<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<Footer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed<'a>>,
}

/// Posts each payload as its own message through the Discord REST API.
///
/// A 429 is waited out and retried as long as the requested wait fits in the
/// delivery timeout.
#[derive(Clone)]
pub struct DiscordSink {
    client: Client,
    messages_url: String,
    token: String,
    max_retry_wait: Duration,
}

impl DiscordSink {
    pub fn new(config: &DiscordConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            messages_url: format!("{}/channels/{}/messages", config.api_base, config.channel_id),
            token: config.token.clone(),
            max_retry_wait: config.timeout,
        })
    }

    async fn post(&self, message: &CreateMessage<'_>) -> Result<(), DeliveryError> {
        let mut retries = 0;
        loop {
            let response = self
                .client
                .post(&self.messages_url)
                .header("Authorization", format!("Bot {}", self.token))
                .json(message)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            if status != StatusCode::TOO_MANY_REQUESTS || retries == MAX_RATE_LIMIT_RETRIES {
                let body = response.text().await.unwrap_or_default();
                return Err(DeliveryError::Rejected { status, body });
            }

            let wait = retry_after(response).await;
            if wait > self.max_retry_wait {
                return Err(DeliveryError::Rejected {
                    status,
                    body: format!("rate limited for {:.1}s", wait.as_secs_f64()),
                });
            }
            retries += 1;
            warn!("Rate limited by Discord, retrying in {:.1}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }
}

/// Wait requested by a 429, from the `Retry-After` header or the
/// `retry_after` body field, both in seconds.
async fn retry_after(response: Response) -> Duration {
    let header = response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok());
    let seconds = match header {
        Some(seconds) => Some(seconds),
        None => response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("retry_after").and_then(Value::as_f64)),
    };
    seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[async_trait]
impl DeliverySink for DiscordSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).ok();

        for payload in &notification.payloads {
            let embed = embed_for(payload, timestamp.clone());
            let message = CreateMessage {
                content: None,
                embeds: vec![embed],
            };
            self.post(&message).await?;
        }

        info!(
            "Delivered {} message(s) for feed {}",
            notification.payloads.len(),
            notification.feed_id
        );
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<(), DeliveryError> {
        debug!("Announcing: {}", text);
        self.post(&CreateMessage {
            content: Some(text),
            embeds: Vec::new(),
        })
        .await
    }
}

fn embed_for(payload: &MessagePayload, timestamp: Option<String>) -> Embed<'_> {
    match payload {
        MessagePayload::Text(text) => Embed {
            title: Some(clip(&text.title, MAX_TITLE_CHARS)),
            description: Some(clip(&text.body, MAX_DESCRIPTION_CHARS)),
            fields: text
                .fields
                .iter()
                .map(|field| Field {
                    name: &field.name,
                    value: &field.value,
                    inline: field.inline,
                })
                .collect(),
            footer: text.footer.as_deref().map(|text| Footer { text }),
            timestamp,
            ..Embed::default()
        },
        MessagePayload::Image(image) => Embed {
            title: image.title.as_deref().map(|title| clip(title, MAX_TITLE_CHARS)),
            image: Some(EmbedImage { url: &image.url }),
            ..Embed::default()
        },
    }
}

/// Truncates to at most `max` characters on a char boundary.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max - 1).collect();
    clipped.push('…');
    clipped
}
