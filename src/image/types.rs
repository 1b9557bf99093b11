//! Core types for image generation.

use serde::{Deserialize, Serialize};

/// Output sizes accepted by the images API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    /// 256x256, small.
    #[serde(rename = "256x256")]
    Small,
    /// 512x512, medium.
    #[serde(rename = "512x512")]
    Medium,
    /// 1024x1024, large square.
    #[default]
    #[serde(rename = "1024x1024")]
    Large,
    /// 1792x1024, wide.
    #[serde(rename = "1792x1024")]
    Wide,
    /// 1024x1792, tall.
    #[serde(rename = "1024x1792")]
    Tall,
}

impl ImageSize {
    /// Returns the size as a `WxH` string (e.g., "1024x1024").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "256x256",
            Self::Medium => "512x512",
            Self::Large => "1024x1024",
            Self::Wide => "1792x1024",
            Self::Tall => "1024x1792",
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rendering quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    /// Standard quality.
    #[default]
    Standard,
    /// Finer detail, slower and more expensive.
    Hd,
}

impl ImageQuality {
    /// Returns the API identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }
}

impl std::fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    /// Hyper-real and dramatic.
    #[default]
    Vivid,
    /// More subdued, natural looking.
    Natural,
}

impl ImageStyle {
    /// Returns the API identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vivid => "vivid",
            Self::Natural => "natural",
        }
    }
}

impl std::fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Image provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    /// OpenAI image models (DALL-E).
    OpenAI,
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

/// Size, quality and style chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Output size.
    pub size: ImageSize,
    /// Rendering quality.
    pub quality: ImageQuality,
    /// Visual style.
    pub style: ImageStyle,
}

/// A request to generate an image.
///
/// Built per submission and discarded once the call completes.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Output size.
    pub size: ImageSize,
    /// Rendering quality.
    pub quality: ImageQuality,
    /// Visual style.
    pub style: ImageStyle,
    /// Bearer token for the remote API.
    pub api_key: String,
}

impl GenerationRequest {
    /// Creates a new request with default settings.
    pub fn new(prompt: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: ImageSize::default(),
            quality: ImageQuality::default(),
            style: ImageStyle::default(),
            api_key: api_key.into(),
        }
    }

    /// Sets the output size.
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    /// Sets the rendering quality.
    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the visual style.
    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }

    /// Applies size, quality and style in one go.
    pub fn with_settings(self, settings: GenerationSettings) -> Self {
        self.with_size(settings.size)
            .with_quality(settings.quality)
            .with_style(settings.style)
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("prompt", &self.prompt)
            .field("size", &self.size)
            .field("quality", &self.quality)
            .field("style", &self.style)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A generated image as kept in the gallery.
///
/// Only the remote URL is stored, never the image bytes. The timestamp
/// (milliseconds since the Unix epoch) doubles as the record's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImageRecord {
    /// Remote URL of the image.
    pub url: String,
    /// Prompt as entered by the user.
    pub prompt: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl GeneratedImageRecord {
    /// Creates a record stamped with the current time.
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt: prompt.into(),
            timestamp: now_millis(),
        }
    }

    /// Creation time as a UTC date-time, if the timestamp is in range.
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }

    /// File name used when downloading this image, e.g. `dalle-image-2024-05-01.png`.
    pub fn download_file_name(&self) -> String {
        match self.created_at() {
            Some(at) => format!("dalle-image-{}.png", at.format("%Y-%m-%d")),
            None => format!("dalle-image-{}.png", self.timestamp),
        }
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
