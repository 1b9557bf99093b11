//! Error types for image generation and local storage.

use crate::store::StoreError;

/// Errors that can occur while generating or managing images.
#[derive(Debug, thiserror::Error)]
pub enum GenStudioError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Invalid request parameters (caught before any network call).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The API answered successfully but the body was not usable.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving a downloaded image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local key-value store error.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl GenStudioError {
    /// Returns the text shown to the user for this error.
    ///
    /// Remote and validation errors surface their bare message
    /// (e.g. "Invalid API key"); everything else uses the full display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(message)
            | Self::Api { message, .. }
            | Self::InvalidRequest(message)
            | Self::UnexpectedResponse(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for genstudio operations.
pub type Result<T> = std::result::Result<T, GenStudioError>;

/// Maximum length of an error message taken from a response body.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Trims an error body to something fit for a notification.
///
/// Collapses whitespace and truncates overly long bodies (HTML error pages
/// from proxies, for instance) on a char boundary.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}
