//! Local key-value persistence.
//!
//! [`KeyValueStore`] is a raw string store in the spirit of browser local
//! storage. [`GalleryStore`] layers the typed credential and image-collection
//! records on top of it and never lets a storage fault escape.

mod file;
mod gallery;
mod memory;

pub use file::FileStore;
pub use gallery::{GalleryStore, CREDENTIAL_KEY, IMAGES_KEY};
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value is larger than the store's quota.
    #[error("quota exceeded for key {key}: {size} bytes > {quota} bytes")]
    QuotaExceeded { key: String, size: usize, quota: usize },

    /// Key cannot be mapped onto the store.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),
}

/// A synchronous string key-value store.
///
/// Serialization is the caller's concern; implementations only move strings.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Rejects values larger than `quota`, if one is configured.
pub(crate) fn check_quota(key: &str, value: &str, quota: Option<usize>) -> Result<(), StoreError> {
    match quota {
        Some(quota) if value.len() > quota => Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}
