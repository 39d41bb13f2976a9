//! Gemini `generateContent` client
//!
//! Implements [`GenerationBackend`] over the Gemini REST API. Optional
//! request features the backend may not understand (`thinkingConfig`,
//! `imageConfig`) are dropped and the request re-sent once when the backend
//! rejects them as unknown fields.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part, ThinkingConfig,
    strip_data_url_prefix,
};
use super::{ChatOptions, GenerationBackend, GenerationError, GenerationResponse, ImageInput};
use crate::config::GeminiConfig;
use crate::media::DataUrl;
use crate::session::HistoryMessage;

const SYSTEM_INSTRUCTION: &str = "Siz \"Pro Banana AI\" asistentsiz.
Siz Gemini 3 Pro (matn) va Gemini 2.5 Flash (tasvir) modellaridan foydalanasiz.
Vazifalaringiz:
1. Foydalanuvchi bilan o'zbek tilida aqlli suhbat qurish.
2. Rasmlarni tahlil qilish va tahrirlash.
3. Murakkab savollarga aniq javob berish.";

/// Appended to the prompt when image output is wanted
const IMAGE_RULES: &str = "\n\nQoidalar: natijani rasm sifatida qaytaring (inlineData). JSON/kod/link yozmang.";

/// Appended on the one re-prompt after an image-less reply
const IMAGE_ONLY_RETRY: &str =
    "\n\nNatijani faqat tahrirlangan rasm (inlineData) ko'rinishida qaytaring. Matn/JSON/kod yozmang.";

const MULTI_IMAGE_ORDER: &str = "\n\nRasm tartibi:\n1) reference/style\n2) target/edit\nQolganlari: qo'shimcha reference.";

const IMAGE_READY_TEXT: &str = "Rasm tayyor!";
const EMPTY_REPLY_TEXT: &str = "Javob olib bo'lmadi.";

/// Gemini REST client
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    api_version: String,
    text_model: String,
    image_model: String,
    temperature: f32,
    thinking_budget: u32,
}

impl GeminiClient {
    /// Create a client from configuration and a shared HTTP client
    pub fn from_config(config: &GeminiConfig, http: Client) -> Self {
        debug!(base_url = %config.base_url, api_version = %config.api_version, "GeminiClient::from_config: called");
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            temperature: config.temperature,
            thinking_budget: config.thinking_budget,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}/models/{}:generateContent", self.base_url, self.api_version, model)
    }

    fn system_instruction() -> Content {
        Content::new("user", vec![Part::text(SYSTEM_INSTRUCTION)])
    }

    /// Post one request and decode the reply
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(%model, contents = request.contents.len(), "generate_content: called");
        let response = self
            .http
            .post(self.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "generate_content: error status");
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let decoded: GenerateContentResponse = serde_json::from_str(&body)?;
        let (mut text, images) = decoded.extract();
        if text.trim().is_empty() {
            text = if images.is_empty() {
                EMPTY_REPLY_TEXT.to_string()
            } else {
                IMAGE_READY_TEXT.to_string()
            };
        }
        debug!(images = images.len(), text_len = text.len(), "generate_content: decoded");
        Ok(GenerationResponse { text, images })
    }

    /// Send, dropping a rejected optional feature and re-sending once
    async fn send_with_downgrade(
        &self,
        model: &str,
        request: &mut GenerateContentRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        match self.generate_content(model, request).await {
            Err(e) if request.generation_config.thinking_config.is_some() && e.is_unknown_field("thinkingConfig") => {
                warn!("Backend rejected thinkingConfig, re-sending without it");
                request.generation_config.thinking_config = None;
                self.generate_content(model, request).await
            }
            Err(e) if request.generation_config.image_config.is_some() && e.is_unknown_field("imageConfig") => {
                warn!("Backend rejected imageConfig, re-sending without it");
                request.generation_config.image_config = None;
                self.generate_content(model, request).await
            }
            other => other,
        }
    }

    pub(crate) fn chat_request(
        &self,
        history: &[HistoryMessage],
        prompt: &str,
        images: &[ImageInput],
        opts: &ChatOptions,
    ) -> (String, GenerateContentRequest) {
        let mut config = GenerationConfig {
            temperature: Some(self.temperature),
            ..Default::default()
        };
        let model = if images.is_empty() {
            config.thinking_config = Some(ThinkingConfig {
                thinking_budget: self.thinking_budget,
            });
            self.text_model.clone()
        } else {
            if opts.want_image {
                config.response_modalities = vec!["IMAGE".to_string(), "TEXT".to_string()];
                config.image_config = opts
                    .aspect_ratio
                    .as_ref()
                    .filter(|ar| !ar.trim().is_empty())
                    .map(|ar| ImageConfig {
                        aspect_ratio: ar.trim().to_string(),
                    });
            }
            self.image_model.clone()
        };

        let request = GenerateContentRequest {
            contents: build_contents(history, prompt, images, opts.want_image),
            system_instruction: Some(Self::system_instruction()),
            generation_config: config,
        };
        (model, request)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn chat(
        &self,
        history: &[HistoryMessage],
        prompt: &str,
        images: &[ImageInput],
        opts: &ChatOptions,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(
            history = history.len(),
            images = images.len(),
            want_image = opts.want_image,
            "GeminiClient::chat: called"
        );
        let (model, mut request) = self.chat_request(history, prompt, images, opts);
        let response = self.send_with_downgrade(&model, &mut request).await?;

        if opts.want_image && !images.is_empty() && response.images.is_empty() {
            debug!("GeminiClient::chat: no image returned, re-prompting for image only");
            let retry_prompt = format!("{}{}", prompt.trim(), IMAGE_ONLY_RETRY);
            request.contents = build_contents(history, &retry_prompt, images, opts.want_image);
            match self.generate_content(&model, &request).await {
                Ok(retry) if !retry.images.is_empty() => return Ok(retry),
                Ok(_) => debug!("GeminiClient::chat: re-prompt returned no image either"),
                Err(e) => debug!(error = %e, "GeminiClient::chat: re-prompt failed"),
            }
        }
        Ok(response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GenerationResponse, GenerationError> {
        debug!("GeminiClient::generate_image: called");
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let mut request = GenerateContentRequest {
            contents: vec![Content::new(
                "user",
                vec![Part::text(format!("Generate a high quality image: {}", prompt))],
            )],
            system_instruction: Some(Self::system_instruction()),
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: Some(ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                }),
                ..Default::default()
            },
        };
        let model = self.image_model.clone();
        self.send_with_downgrade(&model, &mut request).await
    }
}

/// Assemble request contents: history turns, then the current turn
///
/// With more than one image each image is preceded by a label naming its
/// role (#1 reference/style, #2 target/edit, the rest extra references).
pub(crate) fn build_contents(
    history: &[HistoryMessage],
    prompt: &str,
    images: &[ImageInput],
    want_image: bool,
) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| {
            let mut parts = vec![Part::text(msg.text.clone())];
            parts.extend(
                msg.image_urls
                    .iter()
                    .filter_map(|url| DataUrl::parse(url, "image/png"))
                    .filter(|url| !url.data.is_empty())
                    .map(|url| Part::inline(url.data, url.mime_type)),
            );
            Content::new(msg.role.as_str(), parts)
        })
        .collect();

    let mut text = prompt.trim().to_string();
    if want_image && !images.is_empty() {
        text.push_str(IMAGE_RULES);
    }

    let mut parts = Vec::new();
    if images.len() <= 1 {
        parts.push(Part::text(text));
        for img in images {
            parts.push(Part::inline(strip_data_url_prefix(&img.data_base64), img.mime_type.clone()));
        }
    } else {
        parts.push(Part::text(format!("{}{}", text, MULTI_IMAGE_ORDER)));
        for (i, img) in images.iter().enumerate() {
            let label = match i {
                0 => "Rasm #1 (reference/style):".to_string(),
                1 => "Rasm #2 (target/edit):".to_string(),
                n => format!("Rasm #{}:", n + 1),
            };
            parts.push(Part::text(label));
            parts.push(Part::inline(strip_data_url_prefix(&img.data_base64), img.mime_type.clone()));
        }
    }
    contents.push(Content::new("user", parts));
    contents
}
