//! OpenAI image generation provider (dall-e-3, dall-e-2).

use crate::error::{sanitize_error_message, GenStudioError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GeneratedImageRecord, GenerationRequest, ImageProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const GENERIC_ERROR: &str = "Failed to generate image";
const NO_DATA_ERROR: &str = "No image data returned";

/// OpenAI image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenAiImageModel {
    /// DALL-E 3 - supports quality and style.
    #[default]
    DallE3,
    /// DALL-E 2 - older, cheaper, small sizes only.
    DallE2,
}

impl OpenAiImageModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DallE3 => "dall-e-3",
            Self::DallE2 => "dall-e-2",
        }
    }
}

/// Builder for OpenAiImageProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiImageProviderBuilder {
    model: OpenAiImageModel,
    base_url: Option<String>,
    prompt_prefix: Option<String>,
}

impl OpenAiImageProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the OpenAI image model variant.
    pub fn model(mut self, model: OpenAiImageModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the API root (e.g. a proxy). Defaults to [`DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Prepends `prefix` to every prompt sent to the API, for example
    /// `"High quality, detailed image of: "`. Stored records keep the
    /// prompt as the user typed it.
    pub fn prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prompt_prefix = Some(prefix.into());
        self
    }

    /// Builds the provider.
    pub fn build(self) -> Result<OpenAiImageProvider> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GenStudioError::InvalidRequest(format!(
                "base URL must be http(s): {base_url}"
            )));
        }

        Ok(OpenAiImageProvider {
            client: reqwest::Client::new(),
            generations_url: format!("{base_url}/images/generations"),
            model: self.model,
            prompt_prefix: self.prompt_prefix,
        })
    }
}

/// OpenAI image generation provider.
///
/// The API key travels with each [`GenerationRequest`], so one provider can
/// serve any credential.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    generations_url: String,
    model: OpenAiImageModel,
    prompt_prefix: Option<String>,
}

impl OpenAiImageProvider {
    /// Creates a new `OpenAiImageProviderBuilder`.
    pub fn builder() -> OpenAiImageProviderBuilder {
        OpenAiImageProviderBuilder::new()
    }

    /// Returns the model this provider requests.
    pub fn model(&self) -> OpenAiImageModel {
        self.model
    }

    fn parse_error(status: u16, text: &str) -> GenStudioError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(text)
            .ok()
            .and_then(|body| body.error)
            .and_then(|error| error.message)
            .map(|m| sanitize_error_message(&m))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_ERROR.to_string());

        match status {
            401 | 403 => GenStudioError::Auth(message),
            _ => GenStudioError::Api { status, message },
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImageRecord> {
        let start = Instant::now();
        let body = OpenAiImageRequest::from_generation_request(
            request,
            &self.model,
            self.prompt_prefix.as_deref(),
        );

        tracing::debug!(
            model = self.model.as_str(),
            size = %request.size,
            quality = %request.quality,
            style = %request.style,
            "submitting image generation request"
        );

        let response = self
            .client
            .post(&self.generations_url)
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &text));
        }

        let openai_response: OpenAiImageResponse = response.json().await?;

        let url = openai_response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| GenStudioError::UnexpectedResponse(NO_DATA_ERROR.into()))?;

        tracing::debug!(
            url = %url,
            duration_ms = (start.elapsed().as_millis() as u64),
            "image generation complete"
        );

        Ok(GeneratedImageRecord::new(url, request.prompt.clone()))
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::OpenAI
    }
}

#[derive(Debug, Serialize)]
struct OpenAiImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
    style: String,
}

impl OpenAiImageRequest {
    fn from_generation_request(
        req: &GenerationRequest,
        model: &OpenAiImageModel,
        prompt_prefix: Option<&str>,
    ) -> Self {
        let prompt = match prompt_prefix {
            Some(prefix) => format!("{prefix}{}", req.prompt),
            None => req.prompt.clone(),
        };
        Self {
            model: model.as_str().to_string(),
            prompt,
            n: 1,
            size: req.size.as_str().to_string(),
            quality: req.quality.as_str().to_string(),
            style: req.style.as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    #[serde(default)]
    error: Option<OpenAiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    #[serde(default)]
    message: Option<String>,
}
