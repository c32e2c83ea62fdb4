use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicKey {
    #[serde(default)]
    pub pak_filename: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl DynamicKey {
    /// Parses the `dynamicKeys` list, skipping entries of the wrong shape.
    pub fn list_from(value: &Value) -> Vec<DynamicKey> {
        value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn describe(&self) -> String {
        format!(
            "`{}` → `{}`",
            self.pak_filename.as_deref().unwrap_or("Pak"),
            self.key.as_deref().unwrap_or("???")
        )
    }
}
