use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// `type` is an object (`{"value": "outfit", ...}`) in current payloads and a
/// bare string in older ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CosmeticType {
    Tagged {
        #[serde(default)]
        value: Option<String>,
    },
    Plain(String),
}

impl CosmeticType {
    pub fn value(&self) -> Option<&str> {
        match self {
            CosmeticType::Tagged { value } => value.as_deref(),
            CosmeticType::Plain(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rarity {
    #[serde(default)]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticImages {
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub featured: Option<String>,
    #[serde(default)]
    pub small_icon: Option<String>,
}

/// A field that fails to parse is left empty without affecting the others.
#[derive(Debug, Clone, Default)]
pub struct Cosmetic {
    pub name: Option<String>,
    pub kind: Option<CosmeticType>,
    pub rarity: Option<Rarity>,
    pub images: Option<CosmeticImages>,
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    serde_json::from_value(value.get(key)?.clone()).ok()
}

impl Cosmetic {
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: field(value, "name"),
            kind: field(value, "type"),
            rarity: field(value, "rarity"),
            images: field(value, "images"),
        }
    }

    pub fn is_outfit(&self) -> bool {
        self.kind
            .as_ref()
            .and_then(CosmeticType::value)
            .map(|kind| kind.eq_ignore_ascii_case("outfit") || kind.eq_ignore_ascii_case("character"))
            .unwrap_or(false)
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("New outfit")
    }

    pub fn label(&self) -> String {
        match self.rarity.as_ref().and_then(|r| r.display_value.as_deref()) {
            Some(rarity) if !rarity.is_empty() => format!("{} ({})", self.display_name(), rarity),
            _ => self.display_name().to_string(),
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        let images = self.images.as_ref()?;
        images
            .icon
            .as_deref()
            .or(images.featured.as_deref())
            .or(images.small_icon.as_deref())
    }
}
