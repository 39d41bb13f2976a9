//! Bot API client over reqwest

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::text::{MAX_CAPTION_BYTES, MAX_MESSAGE_BYTES, split_by_bytes, truncate_by_bytes};
use super::types::{ApiResponse, File};
use super::{ChatTransport, InlineKeyboardMarkup, Message, TransportError, Update, User};
use crate::config::TelegramConfig;
use crate::media::{DataUrl, FALLBACK_MIME, resolve_content_type};

/// Telegram Bot API client
pub struct TelegramClient {
    http: Client,
    method_base: String,
    file_base: String,
}

impl TelegramClient {
    pub fn from_config(config: &TelegramConfig, http: Client) -> Self {
        debug!(api_url = %config.api_url, "TelegramClient::from_config: called");
        let api_url = config.api_url.trim_end_matches('/');
        Self {
            http,
            method_base: format!("{}/bot{}", api_url, config.token),
            file_base: format!("{}/file/bot{}", api_url, config.token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.method_base, method)
    }

    /// Unwrap the Bot API envelope
    async fn decode<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        if !envelope.ok {
            debug!(%method, status = status.as_u16(), "decode: API error");
            return Err(TransportError::Api {
                code: envelope.error_code.unwrap_or(status.as_u16()),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope
            .result
            .ok_or_else(|| TransportError::MissingResult(method.to_string()))
    }

    /// Call a method with a JSON body
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TransportError> {
        debug!(%method, "call: called");
        let response = self.http.post(self.method_url(method)).json(body).send().await?;
        Self::decode(method, response).await
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_typing(&self, chat_id: i64) -> Result<(), TransportError> {
        self.call::<bool>("sendChatAction", &json!({"chat_id": chat_id, "action": "typing"}))
            .await
            .map(|_| ())
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        debug!(%chat_id, len = text.len(), "TelegramClient::send_text: called");
        for chunk in split_by_bytes(text, MAX_MESSAGE_BYTES) {
            self.call::<Message>("sendMessage", &json!({"chat_id": chat_id, "text": chunk}))
                .await?;
        }
        Ok(())
    }

    async fn send_photo_data_url(&self, chat_id: i64, data_url: &str, caption: &str) -> Result<(), TransportError> {
        debug!(%chat_id, "TelegramClient::send_photo_data_url: called");
        let url = DataUrl::parse(data_url, FALLBACK_MIME)
            .ok_or_else(|| TransportError::InvalidDataUrl("empty or malformed".to_string()))?;
        let bytes = url.decode()?;
        let file_name = format!("image{}", url.extension());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&url.mime_type)
            .map_err(|e| TransportError::InvalidDataUrl(format!("mime {}: {}", url.mime_type, e)))?;
        let mut form = Form::new().text("chat_id", chat_id.to_string()).part("photo", part);
        if !caption.is_empty() {
            form = form.text("caption", truncate_by_bytes(caption, MAX_CAPTION_BYTES).to_string());
        }

        let response = self
            .http
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::decode::<Message>("sendPhoto", response).await.map(|_| ())
    }

    async fn send_text_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<i64, TransportError> {
        debug!(%chat_id, "TelegramClient::send_text_with_keyboard: called");
        let msg: Message = self
            .call(
                "sendMessage",
                &json!({"chat_id": chat_id, "text": text, "reply_markup": keyboard}),
            )
            .await?;
        Ok(msg.message_id)
    }

    async fn edit_text_with_keyboard(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<(), TransportError> {
        debug!(%chat_id, %message_id, "TelegramClient::edit_text_with_keyboard: called");
        // editMessageText returns the edited Message, or true for inline messages
        self.call::<Value>(
            "editMessageText",
            &json!({"chat_id": chat_id, "message_id": message_id, "text": text, "reply_markup": keyboard}),
        )
        .await
        .map(|_| ())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), TransportError> {
        debug!(%callback_id, %show_alert, "TelegramClient::answer_callback: called");
        self.call::<bool>(
            "answerCallbackQuery",
            &json!({"callback_query_id": callback_id, "text": text, "show_alert": show_alert}),
        )
        .await
        .map(|_| ())
    }

    async fn download_file(&self, file_id: &str) -> Result<(Vec<u8>, String), TransportError> {
        debug!(%file_id, "TelegramClient::download_file: called");
        let file: File = self.call("getFile", &json!({"file_id": file_id})).await?;
        let path = file
            .file_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TransportError::MissingResult("getFile.file_path".to_string()))?;

        let response = self.http.get(format!("{}/{}", self.file_base, path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "File download failed");
            return Err(TransportError::Download {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let header = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        let mime = resolve_content_type(header.as_deref(), &bytes);
        debug!(size = bytes.len(), %mime, "TelegramClient::download_file: done");
        Ok((bytes, mime))
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TransportError> {
        debug!(%offset, %timeout_secs, "TelegramClient::get_updates: called");
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = TelegramConfig {
            token: "123:abc".to_string(),
            api_url: "http://localhost:8081/".to_string(),
            poll_timeout_secs: 30,
        };
        let client = TelegramClient::from_config(&config, Client::new());
        assert_eq!(client.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
        assert_eq!(client.file_base, "http://localhost:8081/file/bot123:abc");
    }

    #[tokio::test]
    async fn test_send_photo_rejects_empty_data_url() {
        let client = TelegramClient::from_config(&TelegramConfig::default(), Client::new());
        let err = client.send_photo_data_url(1, "  ", "").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidDataUrl(_)));
    }
}
