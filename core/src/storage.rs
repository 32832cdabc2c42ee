//! Key-value blob persistence.
//!
//! A [`BlobStore`] is the durable side of a state holder: it maps a fixed
//! string key to an opaque text blob. The core never interprets the blob;
//! encoding and decoding belong to the feature that owns the key.
//!
//! ```ignore
//! store.save("todos", r#"[{"id":1,"text":"buy milk","done":false}]"#).await?;
//! let text = store.get("todos").await?;
//! ```

use std::future::Future;

/// Error type for blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem or OS level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used by this backend
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable key-value store for text blobs.
///
/// `save` is a full overwrite of the value under `key`. A subsequent `get`
/// for the same key, in the same process, observes the saved text.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn save(&self, key: &str, data: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Checks that `key` is usable as a storage key: non-empty and limited to
/// ASCII letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] otherwise.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
