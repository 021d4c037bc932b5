//! One key-addressed JSON namespace on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CacheError, CacheNamespace, CacheRecord};

/// Field name of the explicit "fetched, nothing found" marker.
pub const EMPTY_MARKER: &str = "_empty";

/// A directory of `<key>.json` files.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
    namespace: CacheNamespace,
}

impl JsonStore {
    /// Opens the namespace directory under `root`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory cannot be created.
    pub fn open(root: &Path, namespace: CacheNamespace) -> Result<Self, CacheError> {
        let dir = root.join(namespace.as_ref());
        std::fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, namespace })
    }

    /// Which namespace this store holds.
    #[must_use]
    pub const fn namespace(&self) -> CacheNamespace {
        self.namespace
    }

    /// The file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Looks up `key`.
    ///
    /// The empty marker, an empty array, and an empty object all read as
    /// [`CacheRecord::Empty`]. A file that cannot be read or decoded reads
    /// as [`CacheRecord::Absent`] so the caller re-fetches instead of
    /// aborting the sweep.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheRecord<T> {
        let path = self.path_for(key);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheRecord::Absent,
            Err(e) => {
                log::warn!("Unreadable {} cache entry {}: {e}", self.namespace, path.display());
                return CacheRecord::Absent;
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "Corrupted {} cache entry {}, will re-fetch: {e}",
                    self.namespace,
                    path.display()
                );
                return CacheRecord::Absent;
            }
        };

        if is_empty_record(&value) {
            return CacheRecord::Empty;
        }

        match serde_json::from_value(value) {
            Ok(payload) => CacheRecord::Present(payload),
            Err(e) => {
                log::warn!(
                    "Malformed {} cache entry {}, will re-fetch: {e}",
                    self.namespace,
                    path.display()
                );
                CacheRecord::Absent
            }
        }
    }

    /// Whether any entry (empty or not) exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false)
    }

    /// Stores a payload. The write is complete and durable when this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialization or the write fails.
    pub async fn put_present<T: Serialize + Sync>(
        &self,
        key: &str,
        payload: &T,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec_pretty(payload)?;
        self.write(key, &bytes).await
    }

    /// Stores the "fetched, nothing found" marker.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the write fails.
    pub async fn put_empty(&self, key: &str) -> Result<(), CacheError> {
        let marker = serde_json::json!({ EMPTY_MARKER: true });
        let bytes = serde_json::to_vec_pretty(&marker)?;
        self.write(key, &bytes).await
    }

    /// Writes to a sibling temp file, syncs it, then renames it into
    /// place so a crash never leaves a half-written entry behind.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        use tokio::io::AsyncWriteExt as _;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| CacheError::Io {
            path: path.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&tmp).await.map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        Ok(())
    }
}

/// Maps a key to a file-safe name. Letters, digits, `-`, `_`, `.`, and
/// `+` pass through; everything else becomes `_`.
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_empty_record(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => {
            map.is_empty()
                || (map.len() == 1
                    && map.get(EMPTY_MARKER).and_then(serde_json::Value::as_bool) == Some(true))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        score: u32,
    }

    fn store(name: &str) -> (PathBuf, JsonStore) {
        let root = std::env::temp_dir().join(format!("place_sweep_store_test_{name}"));
        let _ = std::fs::remove_dir_all(&root);
        let store = JsonStore::open(&root, CacheNamespace::Grid).unwrap();
        (root, store)
    }

    #[tokio::test]
    async fn missing_key_is_absent() {
        let (root, store) = store("absent");
        assert_eq!(store.get::<Vec<Item>>("nope").await, CacheRecord::Absent);
        assert!(!store.contains("nope").await);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn present_round_trips() {
        let (root, store) = store("present");
        let items = vec![Item {
            id: "a".to_string(),
            score: 3,
        }];
        store.put_present("40.7_-74.05_40.71_-74.04", &items).await.unwrap();

        assert_eq!(
            store.get::<Vec<Item>>("40.7_-74.05_40.71_-74.04").await,
            CacheRecord::Present(items)
        );
        assert!(store.contains("40.7_-74.05_40.71_-74.04").await);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn empty_marker_is_empty_not_absent() {
        let (root, store) = store("empty");
        store.put_empty("cell").await.unwrap();

        let record = store.get::<Vec<Item>>("cell").await;
        assert_eq!(record, CacheRecord::Empty);
        assert_eq!(record.into_cached(), Some(Vec::new()));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn bare_empty_collections_read_as_empty() {
        let (root, store) = store("bare_empty");
        std::fs::write(store.path_for("list"), "[]").unwrap();
        std::fs::write(store.path_for("object"), "{}").unwrap();

        assert_eq!(store.get::<Vec<Item>>("list").await, CacheRecord::Empty);
        assert_eq!(store.get::<Item>("object").await, CacheRecord::Empty);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn corrupted_entry_degrades_to_absent() {
        let (root, store) = store("corrupt");
        std::fs::write(store.path_for("broken"), "[{\"id\": \"a\", ").unwrap();
        std::fs::write(store.path_for("wrong_shape"), "{\"unexpected\": 1}").unwrap();

        assert_eq!(store.get::<Vec<Item>>("broken").await, CacheRecord::Absent);
        assert_eq!(store.get::<Item>("wrong_shape").await, CacheRecord::Absent);

        // A re-fetch overwrites the bad entry.
        store.put_empty("broken").await.unwrap();
        assert_eq!(store.get::<Vec<Item>>("broken").await, CacheRecord::Empty);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn overwrite_replaces_previous_payload() {
        let (root, store) = store("overwrite");
        let first = Item {
            id: "a".to_string(),
            score: 1,
        };
        let second = Item {
            id: "a".to_string(),
            score: 2,
        };
        store.put_present("k", &first).await.unwrap();
        store.put_present("k", &second).await.unwrap();
        assert_eq!(store.get::<Item>("k").await, CacheRecord::Present(second));
        assert!(!store.path_for("k").with_extension("json.tmp").exists());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn sanitizes_unsafe_key_characters() {
        assert_eq!(sanitize_key("places/ChIJ:abc"), "places_ChIJ_abc");
        assert_eq!(sanitize_key("40.7_-74.05"), "40.7_-74.05");
    }
}
