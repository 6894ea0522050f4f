//! File-backed key-value store.
//!
//! Each key maps to one file under the root directory. Keys such as
//! `@GoMarketplace:products` contain characters that are not safe in file
//! names on every platform, so anything outside `[A-Za-z0-9.-]` is written
//! as `_XX` (uppercase hex of each byte).

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::instrument;

use super::{KeyValueStore, StorageError};

const FILE_EXTENSION: &str = "json";

/// A [`KeyValueStore`] that persists each value to its own file.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a reader never observes a partially written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding `key`.
    #[must_use]
    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{FILE_EXTENSION}", encode_key(key)))
    }
}

/// Encode a key into a portable file stem.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
            encoded.push(char::from(byte));
        } else {
            // Writing to a String cannot fail
            let _ = write!(encoded, "_{byte:02X}");
        }
    }
    encoded
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(root = %self.root.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let target = self.path_for(key);
        let tmp = target.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %target.display(), "Value written");
        Ok(())
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        assert_eq!(
            encode_key("@GoMarketplace:products"),
            "_40GoMarketplace_3Aproducts"
        );
        assert_eq!(encode_key("plain-key.v1"), "plain-key.v1");
        assert_eq!(encode_key("a/b"), "a_2Fb");
        assert_eq!(encode_key("a_b"), "a_5Fb");
    }

    #[test]
    fn test_distinct_keys_map_to_distinct_files() {
        let store = FileStore::new("/tmp/carts");
        assert_ne!(store.path_for("a:b"), store.path_for("a_3Ab"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_root_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set("@GoMarketplace:products", "[]").await.unwrap();

        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(
            reopened.get("@GoMarketplace:products").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_set_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("k.json")]);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("k", "v").await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
