//! Image generation module.

mod download;
mod provider;
pub mod providers;
mod types;

pub use download::ImageDownloader;
pub use provider::{generate_image, validate_request, ImageProvider};
pub use types::{
    now_millis, GeneratedImageRecord, GenerationRequest, GenerationSettings, ImageProviderKind,
    ImageQuality, ImageSize, ImageStyle,
};
