use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::FortniteApiConfig;
use crate::error::{FetchCause, FetchError};
use crate::feed::{Document, Feed};

/// Retrieves the current `data` document of a feed. One request per call,
/// no retries.
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
    api_key: Option<String>,
    language: Option<String>,
}

impl FeedFetcher {
    pub fn new(config: &FortniteApiConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fortnite-feed-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    pub async fn fetch(&self, feed: &Feed) -> Result<Document, FetchError> {
        info!("Fetching feed {} from {}", feed.id, feed.url);

        let mut request = self.client.get(&feed.url);
        if let Some(language) = &self.language {
            request = request.query(&[("language", language)]);
        }
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&feed.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::new(
                &feed.id,
                FetchCause::Status {
                    status,
                    body: body.chars().take(200).collect(),
                },
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&feed.id, e))?;
        let envelope: Value = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::new(&feed.id, FetchCause::Malformed(e.to_string())))?;

        let document = extract_payload(envelope).map_err(|cause| FetchError::new(&feed.id, cause))?;
        debug!("Fetched feed {} ({} bytes)", feed.id, bytes.len());
        Ok(document)
    }
}

/// Pulls the `data` field out of an API envelope.
fn extract_payload(envelope: Value) -> Result<Document, FetchCause> {
    let Value::Object(mut envelope) = envelope else {
        return Err(FetchCause::Malformed("response envelope is not an object".to_string()));
    };
    match envelope.remove("data") {
        Some(data @ (Value::Object(_) | Value::Array(_))) => Ok(data),
        _ => Err(FetchCause::EmptyPayload),
    }
}
