use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response carried no usable `data` payload")]
    EmptyPayload,
}

#[derive(Debug, Error)]
#[error("fetch failed for feed `{feed_id}`: {cause}")]
pub struct FetchError {
    pub feed_id: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(feed_id: &str, cause: FetchCause) -> Self {
        Self {
            feed_id: feed_id.to_string(),
            cause,
        }
    }

    pub fn from_reqwest(feed_id: &str, err: reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            FetchCause::Timeout
        } else if err.is_decode() {
            FetchCause::Malformed(err.to_string())
        } else {
            FetchCause::Transport(err)
        };
        Self::new(feed_id, cause)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid snapshot key `{0}`")]
    InvalidKey(String),

    #[error("snapshot I/O failed for `{feed_id}`: {source}")]
    Io {
        feed_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored snapshot for `{feed_id}` is corrupt: {source}")]
    Corrupt {
        feed_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot for `{feed_id}` could not be serialized: {source}")]
    Serialize {
        feed_id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery timed out")]
    Timeout,

    #[error("delivery transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("delivery rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::Timeout
        } else {
            DeliveryError::Transport(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("delivery failed for feed `{feed_id}`: {source}")]
    Delivery {
        feed_id: String,
        #[source]
        source: DeliveryError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("feed task failed: {0}")]
    Task(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
