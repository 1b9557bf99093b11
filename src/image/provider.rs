//! Image provider trait and the notifying generation entry point.

use crate::error::{GenStudioError, Result};
use crate::image::types::{GeneratedImageRecord, GenerationRequest, ImageProviderKind};
use crate::notify::Notifier;
use async_trait::async_trait;

/// Trait for image generation providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    ///
    /// Issues exactly one request; failures are returned, never retried.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImageRecord>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ImageProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ImageProviderKind::OpenAI => "OpenAI (DALL-E)",
        }
    }
}

#[async_trait]
impl<P: ImageProvider + ?Sized> ImageProvider for std::sync::Arc<P> {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImageRecord> {
        (**self).generate(request).await
    }

    fn kind(&self) -> ImageProviderKind {
        (**self).kind()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Checks the preconditions that must hold before any network call.
pub fn validate_request(request: &GenerationRequest) -> Result<()> {
    if request.api_key.trim().is_empty() {
        return Err(GenStudioError::Auth(
            "Please provide an OpenAI API key".into(),
        ));
    }
    if request.prompt.trim().is_empty() {
        return Err(GenStudioError::InvalidRequest(
            "Please provide a prompt".into(),
        ));
    }
    Ok(())
}

/// Generates an image, reporting any failure to `notifier`.
///
/// Returns `None` on every failure path: invalid input (no network call is
/// made), remote errors, transport faults and empty responses.
pub async fn generate_image<P, N>(
    provider: &P,
    request: &GenerationRequest,
    notifier: &N,
) -> Option<GeneratedImageRecord>
where
    P: ImageProvider + ?Sized,
    N: Notifier + ?Sized,
{
    let outcome = match validate_request(request) {
        Ok(()) => provider.generate(request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!(provider = provider.name(), "image generation failed: {e}");
            notifier.error(&e.user_message());
            None
        }
    }
}
