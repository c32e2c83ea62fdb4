use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use crate::error::StoreError;
use crate::feed::Document;

/// One pretty-printed JSON file per feed under a data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| StoreError::Io {
            feed_id: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Returns `None` when no snapshot was ever saved for the feed.
    pub async fn load(&self, feed_id: &str) -> Result<Option<Document>, StoreError> {
        let path = self.path_for(feed_id)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    feed_id: feed_id.to_string(),
                    source,
                })
            }
        };
        let document = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            feed_id: feed_id.to_string(),
            source,
        })?;
        Ok(Some(document))
    }

    /// Replaces the snapshot via a temp file and rename so a failed write
    /// never clobbers the previous one.
    pub async fn save(&self, feed_id: &str, document: &Document) -> Result<(), StoreError> {
        let path = self.path_for(feed_id)?;
        let content = serde_json::to_vec_pretty(document).map_err(|source| StoreError::Serialize {
            feed_id: feed_id.to_string(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| StoreError::Io {
            feed_id: feed_id.to_string(),
            source,
        };
        if let Err(e) = fs::write(&temp_path, &content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_err(e));
        }
        fs::rename(&temp_path, &path).await.map_err(io_err)?;

        debug!("Saved snapshot for {} ({} bytes)", feed_id, content.len());
        Ok(())
    }

    fn path_for(&self, feed_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !feed_id.is_empty()
            && feed_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(feed_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", feed_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_snapshot_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(store.load("map").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_document_is_not_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path()).await.unwrap();

        store.save("shop", &json!({})).await.unwrap();
        store.save("playlists", &json!([])).await.unwrap();

        assert_eq!(store.load("shop").await.unwrap(), Some(json!({})));
        assert_eq!(store.load("playlists").await.unwrap(), Some(json!([])));
    }

    #[tokio::test]
    async fn save_overwrites_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path().join("data")).await.unwrap();

        store.save("aes", &json!({"build": "1"})).await.unwrap();
        store.save("aes", &json!({"build": "2"})).await.unwrap();
        assert_eq!(store.load("aes").await.unwrap(), Some(json!({"build": "2"})));

        let tmp_count = std::fs::read_dir(temp_dir.path().join("data"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(tmp_count, 0);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path()).await.unwrap();
        store.save("news", &json!({"v": 1})).await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(temp_dir.path().join("news.json.tmp")).unwrap();
        let result = store.save("news", &json!({"v": 2})).await;

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(store.load("news").await.unwrap(), Some(json!({"v": 1})));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path()).await.unwrap();
        std::fs::write(temp_dir.path().join("map.json"), b"{not json").unwrap();

        assert!(matches!(
            store.load("map").await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path()).await.unwrap();
        assert!(matches!(
            store.save("../escape", &json!(1)).await,
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn preserves_key_order_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(temp_dir.path()).await.unwrap();
        let doc = json!({"zeta": 1, "alpha": 2});
        store.save("shop", &doc).await.unwrap();

        let loaded = store.load("shop").await.unwrap().unwrap();
        let keys: Vec<_> = loaded.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
