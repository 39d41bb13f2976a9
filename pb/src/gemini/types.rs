//! Generation request/response types
//!
//! Public types used by callers, plus the `generateContent` wire format.

use serde::{Deserialize, Serialize};

use crate::media::DataUrl;

/// One image sent along with a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Base64 payload; a full data URL is accepted and its prefix ignored
    pub data_base64: String,
    pub mime_type: String,
}

impl ImageInput {
    pub fn new(data_base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data_base64: data_base64.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let url = DataUrl::from_bytes(mime_type, bytes);
        Self::new(url.data, url.mime_type)
    }

    /// The image as a `data:` URL
    pub fn to_data_url(&self) -> String {
        DataUrl::new(self.mime_type.clone(), strip_data_url_prefix(&self.data_base64)).to_string()
    }
}

/// Per-call options for chat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatOptions {
    /// Ask for image output alongside text
    pub want_image: bool,
    /// Requested aspect ratio for image output
    pub aspect_ratio: Option<String>,
}

/// What the backend returned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: String,
    /// Returned images as `data:` URLs
    pub images: Vec<String>,
}

/// Everything after the first comma, or the whole value
pub(crate) fn strip_data_url_prefix(value: &str) -> &str {
    value.split_once(',').map(|(_, data)| data).unwrap_or(value)
}

// Wire format

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThinkingConfig {
    pub thinking_budget: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: &str, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                data: data.into(),
                mime_type: mime_type.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Blob {
    #[serde(default)]
    pub data: String,
    #[serde(default, alias = "mime_type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    /// Concatenated text and data-URL images of the first candidate
    pub fn extract(&self) -> (String, Vec<String>) {
        let Some(candidate) = self.candidates.first() else {
            return (String::new(), Vec::new());
        };
        let mut text = String::new();
        let mut images = Vec::new();
        for part in &candidate.content.parts {
            if let Some(t) = &part.text {
                text.push_str(t);
            }
            if let Some(blob) = &part.inline_data
                && !blob.data.is_empty()
                && !blob.mime_type.is_empty()
            {
                images.push(DataUrl::new(blob.mime_type.clone(), blob.data.clone()).to_string());
            }
        }
        (text, images)
    }
}
