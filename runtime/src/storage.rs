//! Durable blob storage on the local filesystem.
//!
//! Each key is stored as `<root>/<key>.json`. Every write goes to its own
//! uniquely named temp file in the root and is renamed into place, so a
//! reader never sees a torn blob and concurrent writers never share a file.

use statekit_core::storage::{validate_key, BlobStore, Result, StorageError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// [`BlobStore`] backed by one file per key under a root directory.
///
/// The root directory is created on first write.
///
/// # Example
///
/// ```no_run
/// use statekit_core::storage::BlobStore;
/// use statekit_runtime::FileBlobStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileBlobStore::new("/var/lib/myapp/state");
/// store.save("todos", "[]").await?;
/// assert_eq!(store.get("todos").await?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Creates a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the blobs
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::trace!(path = %path.display(), "No blob stored");
                Ok(None)
            },
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, key: &str, data: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let root = self.root.clone();
        let target = path.clone();
        let bytes = data.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || replace_file(&root, &target, &bytes))
            .await
            .map_err(|error| StorageError::Backend(format!("Blob write task failed: {error}")))??;

        tracing::trace!(path = %path.display(), bytes = data.len(), "Blob saved");
        Ok(())
    }
}

/// Write `bytes` to a fresh temp file in `root`, then rename it over `target`.
fn replace_file(root: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
    let mut staging = tempfile::Builder::new()
        .prefix(".blob-")
        .suffix(".tmp")
        .tempfile_in(root)?;
    staging.write_all(bytes)?;
    staging.as_file().sync_all()?;
    staging.persist(target).map_err(|error| error.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path());

        assert_eq!(store.get("todos").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path().join("nested"));

        store.save("todos", r#"[{"id":1}]"#).await.unwrap();
        assert_eq!(
            store.get("todos").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );

        store.save("todos", "[]").await.unwrap();
        assert_eq!(store.get("todos").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(std::fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_share_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let left = FileBlobStore::new(dir.path());
        let right = FileBlobStore::new(dir.path());

        for round in 0..20 {
            let a = format!("[\"left-{round}\"]");
            let b = format!("[\"right-{round}\"]");
            let (saved_a, saved_b) = tokio::join!(left.save("todos", &a), right.save("todos", &b));
            saved_a.unwrap();
            saved_b.unwrap();

            let stored = left.get("todos").await.unwrap().unwrap();
            assert!(stored == a || stored == b, "torn or foreign blob: {stored}");
        }

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("todos.json")]);
    }

    #[tokio::test]
    async fn writes_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();

        FileBlobStore::new(dir.path()).save("todos", "[]").await.unwrap();
        let reopened = FileBlobStore::new(dir.path());

        assert_eq!(reopened.get("todos").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn rejects_keys_that_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path());

        let result = store.save("../outside", "x").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
