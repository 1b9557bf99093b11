#![warn(missing_docs)]
//! GenStudio - text-to-image generation with a local gallery.
//!
//! Prompts are sent to the OpenAI images API; each result is kept as a small
//! record (remote URL, prompt, creation timestamp) in a local key-value
//! store. Image bytes are never stored.
//!
//! # Quick Start
//!
//! ```no_run
//! use genstudio::{FileStore, OpenAiImageProvider, Studio, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let provider = OpenAiImageProvider::builder().build()?;
//!     let store = FileStore::open("/tmp/genstudio")?;
//!     let mut studio = Studio::new(provider, store, TracingNotifier);
//!
//!     studio.set_credential("sk-...");
//!     if let Some(image) = studio.submit_prompt("A red fox in snow").await {
//!         println!("{}", image.url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Layers
//!
//! - [`store`]: string key-value stores and the typed [`GalleryStore`].
//! - [`image`]: request/record types, the [`ImageProvider`] trait and the
//!   OpenAI provider.
//! - [`Studio`]: application state and user actions.
//!
//! # Features
//!
//! - `cli` (default): the `genstudio` command-line interface.

pub mod config;
mod error;
pub mod image;
mod notify;
pub mod store;
mod studio;

// Re-export error types at crate root
pub use error::{GenStudioError, Result};

pub use config::Config;
pub use image::providers::{OpenAiImageModel, OpenAiImageProvider, OpenAiImageProviderBuilder};
pub use image::{
    generate_image, GeneratedImageRecord, GenerationRequest, GenerationSettings, ImageDownloader,
    ImageProvider, ImageProviderKind, ImageQuality, ImageSize, ImageStyle,
};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use store::{FileStore, GalleryStore, KeyValueStore, MemoryStore, StoreError};
pub use studio::{mask_credential, BusyFlag, Studio, View};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{GenStudioError, Result};
    pub use crate::image::{
        GeneratedImageRecord, GenerationRequest, GenerationSettings, ImageProvider, ImageQuality,
        ImageSize, ImageStyle,
    };
    pub use crate::image::providers::OpenAiImageProvider;
    pub use crate::notify::Notifier;
    pub use crate::store::{FileStore, KeyValueStore, MemoryStore};
    pub use crate::studio::Studio;
}
