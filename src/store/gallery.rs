//! Typed credential and image-collection records over a key-value store.

use super::KeyValueStore;
use crate::image::GeneratedImageRecord;

/// Key holding the API credential.
pub const CREDENTIAL_KEY: &str = "openai-api-key";

/// Key holding the JSON-serialized image collection.
pub const IMAGES_KEY: &str = "dalle-generated-images";

/// Sole authority for durable gallery state.
///
/// None of these operations fail: store faults are logged and degrade to an
/// empty read or a skipped write, leaving the previous contents intact.
#[derive(Debug, Clone)]
pub struct GalleryStore<S> {
    store: S,
}

impl<S: KeyValueStore> GalleryStore<S> {
    /// Wraps a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying key-value store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Returns the stored credential, or an empty string if there is none.
    pub fn get_credential(&self) -> String {
        match self.store.get(CREDENTIAL_KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read API key from store");
                String::new()
            }
        }
    }

    /// Overwrites the stored credential.
    pub fn set_credential(&self, value: &str) {
        if let Err(e) = self.store.set(CREDENTIAL_KEY, value) {
            tracing::warn!(error = %e, "failed to save API key to store");
        }
    }

    /// Removes the stored credential.
    pub fn clear_credential(&self) {
        if let Err(e) = self.store.remove(CREDENTIAL_KEY) {
            tracing::warn!(error = %e, "failed to remove API key from store");
        }
    }

    /// Returns the persisted collection, newest first.
    ///
    /// An absent or unreadable collection reads as empty.
    pub fn list_images(&self) -> Vec<GeneratedImageRecord> {
        let raw = match self.store.get(IMAGES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read images from store");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored image collection is not valid JSON");
            Vec::new()
        })
    }

    /// Prepends `record` to the persisted collection.
    pub fn add_image(&self, record: GeneratedImageRecord) {
        let mut images = self.list_images();
        images.insert(0, record);
        self.write_images(&images, "save image");
    }

    /// Removes every record whose timestamp equals `timestamp`.
    ///
    /// Returns false when no record matched.
    pub fn remove_image(&self, timestamp: i64) -> bool {
        let mut images = self.list_images();
        let before = images.len();
        images.retain(|img| img.timestamp != timestamp);
        if images.len() == before {
            tracing::debug!(timestamp, "no image with this timestamp");
            return false;
        }
        self.write_images(&images, "delete image");
        true
    }

    /// Deletes the whole collection.
    pub fn clear_images(&self) {
        if let Err(e) = self.store.remove(IMAGES_KEY) {
            tracing::warn!(error = %e, "failed to clear images from store");
        }
    }

    fn write_images(&self, images: &[GeneratedImageRecord], action: &str) {
        let json = match serde_json::to_string(images) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize images, could not {action}");
                return;
            }
        };
        if let Err(e) = self.store.set(IMAGES_KEY, &json) {
            tracing::warn!(error = %e, "failed to write images to store, could not {action}");
        }
    }
}
