//! Generation backend error types

use thiserror::Error;

/// Errors that can occur while talking to the generation backend
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt is empty")]
    EmptyPrompt,
}

impl GenerationError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::ApiError { status, .. } => Some(*status),
            GenerationError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the backend rejected `field` as an unknown request field
    pub fn is_unknown_field(&self, field: &str) -> bool {
        match self {
            GenerationError::ApiError { message, .. } => message.contains("Unknown name") && message.contains(field),
            _ => false,
        }
    }
}
