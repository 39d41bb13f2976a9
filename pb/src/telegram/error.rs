//! Chat transport error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Bot API error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("File download failed {status}: {message}")]
    Download { status: u16, message: String },

    #[error("Bot API reply had no result for {0}")]
    MissingResult(String),
}

impl TransportError {
    /// An edit that would not change the message
    pub fn is_not_modified(&self) -> bool {
        matches!(self, TransportError::Api { description, .. } if description.contains("message is not modified"))
    }
}
