use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::feed::{Feed, KnownFeed};

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub channel_id: u64,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct FortniteApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub api: FortniteApiConfig,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub feeds: Vec<Feed>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |key: &str, default: u64| -> Result<u64> {
            match var(key) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("{} must be a whole number, got `{}`", key, raw)),
                None => Ok(default),
            }
        };

        let token = var("DISCORD_TOKEN")
            .or_else(|| var("TOKEN"))
            .context("DISCORD_TOKEN must be set")?;
        let channel_id: u64 = var("CHANNEL_ID")
            .context("CHANNEL_ID must be set")?
            .parse()
            .context("CHANNEL_ID must be a numeric channel id")?;
        if channel_id == 0 {
            bail!("CHANNEL_ID must not be 0");
        }

        let poll_minutes = number("POLL_INTERVAL_MINUTES", 5)?;
        if poll_minutes == 0 {
            bail!("POLL_INTERVAL_MINUTES must be at least 1");
        }
        let poll_secs = poll_minutes
            .checked_mul(60)
            .with_context(|| format!("POLL_INTERVAL_MINUTES is too large: {}", poll_minutes))?;

        let base_url = var("API_BASE_URL")
            .unwrap_or_else(|| "https://fortnite-api.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let selected = match var("FEEDS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<KnownFeed>)
                .collect::<Result<Vec<_>>>()?,
            None => KnownFeed::ALL.to_vec(),
        };
        if selected.is_empty() {
            bail!("FEEDS must name at least one feed");
        }
        let mut feeds: Vec<Feed> = Vec::new();
        for known in selected {
            if !feeds.iter().any(|feed| feed.id == known.id()) {
                feeds.push(known.to_feed(&base_url));
            }
        }

        Ok(Config {
            discord: DiscordConfig {
                token,
                channel_id,
                api_base: var("DISCORD_API_BASE")
                    .unwrap_or_else(|| "https://discord.com/api/v10".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(number("DELIVERY_TIMEOUT_SECS", 15)?),
            },
            api: FortniteApiConfig {
                base_url,
                api_key: var("FORTNITE_API_KEY"),
                language: Some(var("API_LANGUAGE").unwrap_or_else(|| "en".to_string())),
                timeout: Duration::from_secs(number("FETCH_TIMEOUT_SECS", 30)?),
            },
            data_dir: PathBuf::from(var("DATA_DIR").unwrap_or_else(|| "data".to_string())),
            poll_interval: Duration::from_secs(poll_secs),
            feeds,
        })
    }
}
