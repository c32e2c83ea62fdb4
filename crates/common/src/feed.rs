use std::str::FromStr;

use anyhow::bail;
use serde_json::Value;

/// A fetched or stored feed payload.
pub type Document = Value;

/// Selects the diff/compose strategy used for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyTag {
    Generic,
    News,
    Map,
    Playlists,
    Aes,
    Cosmetics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: String,
    pub display_name: String,
    pub url: String,
    pub strategy: StrategyTag,
}

impl Feed {
    pub fn new(id: &str, display_name: &str, url: &str, strategy: StrategyTag) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            url: url.to_string(),
            strategy,
        }
    }
}

/// The feeds this tracker knows how to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFeed {
    Cosmetics,
    News,
    Shop,
    Playlists,
    Map,
    Aes,
}

impl KnownFeed {
    pub const ALL: [KnownFeed; 6] = [
        KnownFeed::Cosmetics,
        KnownFeed::News,
        KnownFeed::Shop,
        KnownFeed::Playlists,
        KnownFeed::Map,
        KnownFeed::Aes,
    ];

    pub fn id(self) -> &'static str {
        match self {
            KnownFeed::Cosmetics => "cosmetics",
            KnownFeed::News => "news",
            KnownFeed::Shop => "shop",
            KnownFeed::Playlists => "playlists",
            KnownFeed::Map => "map",
            KnownFeed::Aes => "aes",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            KnownFeed::Cosmetics => "Cosmetics",
            KnownFeed::News => "News",
            KnownFeed::Shop => "Item Shop",
            KnownFeed::Playlists => "Playlists",
            KnownFeed::Map => "Map",
            KnownFeed::Aes => "AES Keys",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            KnownFeed::Cosmetics => "/v2/cosmetics/br",
            KnownFeed::News => "/v2/news",
            KnownFeed::Shop => "/v2/shop/br",
            KnownFeed::Playlists => "/v1/playlists",
            KnownFeed::Map => "/v1/map",
            KnownFeed::Aes => "/v2/aes",
        }
    }

    pub fn strategy(self) -> StrategyTag {
        match self {
            KnownFeed::Cosmetics => StrategyTag::Cosmetics,
            KnownFeed::News => StrategyTag::News,
            KnownFeed::Shop => StrategyTag::Generic,
            KnownFeed::Playlists => StrategyTag::Playlists,
            KnownFeed::Map => StrategyTag::Map,
            KnownFeed::Aes => StrategyTag::Aes,
        }
    }

    pub fn to_feed(self, api_base_url: &str) -> Feed {
        let url = format!("{}{}", api_base_url.trim_end_matches('/'), self.path());
        Feed::new(self.id(), self.display_name(), &url, self.strategy())
    }
}

impl FromStr for KnownFeed {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        match KnownFeed::ALL.iter().find(|feed| feed.id() == wanted) {
            Some(feed) => Ok(*feed),
            None => bail!("unknown feed `{}`", s.trim()),
        }
    }
}
