//! Update routing
//!
//! [`Handler`] turns chat updates into calls on the generation backend and
//! the preview wizard. It owns no I/O of its own: replies go through a
//! [`ChatTransport`], generations through a [`GenerationBackend`].

pub mod command;
pub mod intent;
pub mod messages;
mod preview;
pub mod wizard;

use std::sync::Arc;

use eyre::Result;
use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::gemini::{ChatOptions, GenerationBackend, GenerationResponse, ImageInput};
use crate::mediagroup::{Aggregator, MediaGroup, MediaItem};
use crate::preview::{PreviewStore, Submenu};
use crate::session::{HistoryMessage, SessionStore};
use crate::telegram::{ChatTransport, Message, Update};

pub use command::{Command, parse_leading_command};
pub use intent::{looks_like_tool_call, wants_image_output};

/// Routes updates for one bot
pub struct Handler {
    transport: Arc<dyn ChatTransport>,
    backend: Arc<dyn GenerationBackend>,
    sessions: Arc<SessionStore>,
    previews: Arc<PreviewStore>,
    catalog: Arc<Catalog>,
    aggregator: Option<Aggregator>,
}

impl Handler {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        backend: Arc<dyn GenerationBackend>,
        sessions: Arc<SessionStore>,
        previews: Arc<PreviewStore>,
        catalog: Arc<Catalog>,
    ) -> Self {
        debug!("Handler::new: called");
        Self {
            transport,
            backend,
            sessions,
            previews,
            catalog,
            aggregator: None,
        }
    }

    /// Route media-group photos through `aggregator` instead of handling them one by one
    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one update from the transport
    pub async fn handle_update(&self, update: Update) -> Result<()> {
        debug!(update_id = update.update_id, "handle_update: called");
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        let Some(msg) = update.message else {
            debug!("handle_update: no message, skipping");
            return Ok(());
        };
        let Some(from) = msg.from.clone() else {
            debug!("handle_update: message without sender, skipping");
            return Ok(());
        };

        let chat_id = msg.chat.id;
        let username = from.display_name();

        if let Some(cmd) = parse_leading_command(msg.text()) {
            return self.handle_command(chat_id, from.id, &username, cmd).await;
        }
        if !msg.photo.is_empty() {
            return self.handle_photo(chat_id, from.id, &username, &msg).await;
        }
        if !msg.text().trim().is_empty() {
            return self.handle_text(chat_id, from.id, &username, msg.text()).await;
        }
        debug!("handle_update: nothing to handle");
        Ok(())
    }

    /// Handle a flushed media group
    pub async fn handle_media_group(&self, group: MediaGroup) -> Result<()> {
        debug!(
            chat_id = group.chat_id,
            group_id = %group.group_id,
            photos = group.file_refs.len(),
            "handle_media_group: called"
        );
        let caption = match group.caption.trim() {
            "" => messages::DEFAULT_GROUP_CAPTION,
            c => c,
        };

        if let Some(cmd) = parse_leading_command(caption)
            && cmd.is_preview()
        {
            return self
                .handle_preview(group.chat_id, group.user_id, &cmd, &group.file_refs)
                .await;
        }
        self.process_photos(group.chat_id, group.user_id, &group.username, caption, &group.file_refs)
            .await
    }

    async fn handle_command(&self, chat_id: i64, user_id: i64, username: &str, cmd: Command) -> Result<()> {
        debug!(%chat_id, %user_id, command = %cmd.name, "handle_command: called");
        match cmd.name.as_str() {
            "start" => self.transport.send_text(chat_id, messages::START).await?,
            "help" => self.transport.send_text(chat_id, messages::HELP).await?,
            "preview" | "cover" => self.start_wizard(chat_id, user_id, &cmd.args, cmd.is_cover()).await?,
            "cancel" => {
                self.previews
                    .update(chat_id, user_id, |st| {
                        st.awaiting_note = false;
                        st.awaiting_photo = false;
                        st.menu = Submenu::Main;
                    })
                    .await;
                self.transport.send_text(chat_id, messages::CANCELLED).await?;
            }
            "clear" => {
                self.sessions.clear(user_id).await;
                self.transport.send_text(chat_id, messages::HISTORY_CLEARED).await?;
            }
            "image" => self.generate_image(chat_id, username, &cmd.args).await?,
            _ => self.transport.send_text(chat_id, messages::UNKNOWN_COMMAND).await?,
        }
        Ok(())
    }

    async fn generate_image(&self, chat_id: i64, username: &str, prompt: &str) -> Result<()> {
        debug!(%chat_id, %username, "generate_image: called");
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.transport.send_text(chat_id, messages::IMAGE_PROMPT_MISSING).await?;
            return Ok(());
        }

        self.typing(chat_id).await;
        self.notify(chat_id, messages::IMAGE_IN_PROGRESS).await;

        let images = match self.backend.generate_image(prompt).await {
            Ok(resp) if !resp.images.is_empty() => resp.images,
            Ok(_) => {
                warn!(%chat_id, "Image generation returned no images");
                self.transport.send_text(chat_id, messages::IMAGE_FAILED).await?;
                return Ok(());
            }
            Err(e) => {
                error!(%chat_id, error = %e, "Image generation failed");
                self.transport.send_text(chat_id, messages::IMAGE_FAILED).await?;
                return Ok(());
            }
        };

        self.send_images(chat_id, &images, &messages::image_ready(prompt)).await
    }

    async fn handle_text(&self, chat_id: i64, user_id: i64, username: &str, text: &str) -> Result<()> {
        let text = text.trim();
        debug!(%chat_id, %user_id, len = text.len(), "handle_text: called");
        if text.is_empty() {
            return Ok(());
        }

        if self.previews.get(chat_id, user_id).await.awaiting_note {
            debug!("handle_text: capturing wizard note");
            self.previews
                .update(chat_id, user_id, |st| {
                    st.note = text.to_string();
                    st.awaiting_note = false;
                    st.menu = Submenu::Main;
                })
                .await;
            self.notify(chat_id, messages::NOTE_SAVED).await;
            return self.render_wizard(chat_id, user_id, true).await;
        }

        self.typing(chat_id).await;
        let history = self.sessions.snapshot(user_id, username).await;
        let resp = match self.backend.chat(&history, text, &[], &ChatOptions::default()).await {
            Ok(resp) => resp,
            Err(e) => {
                error!(%chat_id, error = %e, "Chat failed");
                self.transport.send_text(chat_id, messages::CHAT_FAILED).await?;
                return Ok(());
            }
        };

        self.sessions
            .append(
                user_id,
                username,
                vec![
                    HistoryMessage::user(text),
                    HistoryMessage::model(resp.text.clone()).with_images(resp.images.clone()),
                ],
            )
            .await;
        self.send_response(chat_id, &resp, false).await
    }

    async fn handle_photo(&self, chat_id: i64, user_id: i64, username: &str, msg: &Message) -> Result<()> {
        let Some(photo) = msg.largest_photo() else {
            return Ok(());
        };
        let file_ref = photo.file_id.clone();
        debug!(%chat_id, %user_id, %file_ref, "handle_photo: called");

        if let (Some(group_id), Some(aggregator)) = (msg.media_group_id.as_deref(), self.aggregator.as_ref()) {
            aggregator.add(MediaItem {
                chat_id,
                user_id,
                username: username.to_string(),
                group_id: group_id.to_string(),
                caption: msg.caption().to_string(),
                file_ref,
            });
            return Ok(());
        }

        let caption = msg.caption().trim();
        if let Some(cmd) = parse_leading_command(caption)
            && cmd.is_preview()
        {
            return self.handle_preview(chat_id, user_id, &cmd, &[file_ref]).await;
        }

        let st = self.previews.get(chat_id, user_id).await;
        if st.awaiting_photo || (caption.is_empty() && st.message_id.is_some() && !st.awaiting_note) {
            debug!("handle_photo: feeding photo to wizard");
            self.previews
                .update(chat_id, user_id, |st| {
                    st.photo_ref = Some(file_ref);
                    st.awaiting_photo = false;
                    st.awaiting_note = false;
                    st.menu = Submenu::Main;
                })
                .await;
            return self.render_wizard(chat_id, user_id, true).await;
        }

        let caption = if caption.is_empty() {
            messages::DEFAULT_PHOTO_CAPTION
        } else {
            caption
        };
        self.process_photos(chat_id, user_id, username, caption, &[file_ref]).await
    }

    /// Download every photo concurrently, as (bytes, content type)
    async fn download_all(&self, file_refs: &[String]) -> Result<Vec<(Vec<u8>, String)>, crate::telegram::TransportError> {
        try_join_all(file_refs.iter().map(|f| self.transport.download_file(f))).await
    }

    /// Multi-image chat with history
    async fn process_photos(
        &self,
        chat_id: i64,
        user_id: i64,
        username: &str,
        caption: &str,
        file_refs: &[String],
    ) -> Result<()> {
        debug!(%chat_id, %user_id, photos = file_refs.len(), "process_photos: called");
        self.typing(chat_id).await;

        let downloads = match self.download_all(file_refs).await {
            Ok(d) => d,
            Err(e) => {
                error!(%chat_id, error = %e, "Photo download failed");
                self.transport.send_text(chat_id, messages::DOWNLOAD_FAILED).await?;
                return Ok(());
            }
        };

        let images: Vec<ImageInput> = downloads
            .iter()
            .map(|(bytes, mime)| ImageInput::from_bytes(mime, bytes))
            .collect();
        let image_urls: Vec<String> = images.iter().map(ImageInput::to_data_url).collect();

        let history = self.sessions.snapshot(user_id, username).await;
        let want_image = wants_image_output(caption, file_refs.len());
        let opts = ChatOptions {
            want_image,
            aspect_ratio: None,
        };
        let resp = match self.backend.chat(&history, caption, &images, &opts).await {
            Ok(resp) => resp,
            Err(e) => {
                error!(%chat_id, error = %e, "Photo prompt failed");
                self.transport.send_text(chat_id, messages::CHAT_FAILED).await?;
                return Ok(());
            }
        };

        self.sessions
            .append(
                user_id,
                username,
                vec![
                    HistoryMessage::user(caption).with_images(image_urls),
                    HistoryMessage::model(resp.text.clone()).with_images(resp.images.clone()),
                ],
            )
            .await;
        info!(%chat_id, images = resp.images.len(), "Photo prompt answered");
        self.send_response(chat_id, &resp, want_image).await
    }

    /// Reply with the backend's images, or its text when there are none
    async fn send_response(&self, chat_id: i64, resp: &GenerationResponse, prefer_image: bool) -> Result<()> {
        if resp.images.is_empty() {
            if prefer_image && looks_like_tool_call(&resp.text) {
                debug!("send_response: reply looks like a tool call");
                self.transport.send_text(chat_id, messages::EDIT_NOT_RETURNED).await?;
            } else {
                self.transport.send_text(chat_id, &resp.text).await?;
            }
            return Ok(());
        }
        self.send_images(chat_id, &resp.images, &resp.text).await
    }

    /// Send images, captioning only the first
    async fn send_images(&self, chat_id: i64, images: &[String], caption: &str) -> Result<()> {
        for (i, image) in images.iter().enumerate() {
            let caption = if i == 0 { caption } else { "" };
            self.transport.send_photo_data_url(chat_id, image, caption).await?;
        }
        Ok(())
    }

    async fn typing(&self, chat_id: i64) {
        if let Err(e) = self.transport.send_typing(chat_id).await {
            debug!(%chat_id, error = %e, "typing: failed");
        }
    }

    /// Best-effort status message
    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text).await {
            warn!(%chat_id, error = %e, "Failed to send status message");
        }
    }
}
