//! Preview wizard I/O: starting, callbacks, rendering and generation

use eyre::Result;
use tracing::{debug, error, info, warn};

use super::command::Command;
use super::wizard::{self, WizardAction};
use super::{Handler, messages};
use crate::gemini::{ChatOptions, GenerationResponse, ImageInput};
use crate::preview::{PreviewState, PromptOptions, Submenu, parse_args, synthesize};
use crate::telegram::CallbackQuery;

/// Seed the wizard from parsed options, keeping an existing note when none was given
fn apply_parsed(st: &mut PreviewState, opts: &PromptOptions) {
    let note = std::mem::take(&mut st.note);
    st.apply_options(opts);
    if opts.note.trim().is_empty() {
        st.note = note;
    }
}

impl Handler {
    fn parse_options(&self, args: &str, cover: bool) -> PromptOptions {
        let defaults = if cover {
            PromptOptions::cover_defaults()
        } else {
            PromptOptions::preview_defaults()
        };
        parse_args(args, defaults, &self.catalog)
    }

    /// Open a fresh wizard panel waiting for a product photo
    pub(super) async fn start_wizard(&self, chat_id: i64, user_id: i64, args: &str, cover: bool) -> Result<()> {
        debug!(%chat_id, %user_id, %args, %cover, "start_wizard: called");
        let opts = self.parse_options(args, cover);
        let st = self
            .previews
            .update(chat_id, user_id, |st| {
                apply_parsed(st, &opts);
                st.photo_ref = None;
                st.awaiting_note = false;
                st.reset_frames();
                st.menu = Submenu::Main;
                st.awaiting_photo = true;
            })
            .await;

        let message_id = self
            .transport
            .send_text_with_keyboard(
                chat_id,
                &wizard::ui_text(&st, &self.catalog),
                &wizard::keyboard(user_id, &st, &self.catalog),
            )
            .await?;
        self.previews
            .update(chat_id, user_id, |st| st.message_id = Some(message_id))
            .await;
        Ok(())
    }

    /// `/preview` or `/cover` arriving together with photos
    pub(super) async fn handle_preview(
        &self,
        chat_id: i64,
        user_id: i64,
        cmd: &Command,
        file_refs: &[String],
    ) -> Result<()> {
        debug!(%chat_id, %user_id, command = %cmd.name, photos = file_refs.len(), "handle_preview: called");
        let Some(first) = file_refs.first().cloned() else {
            self.transport.send_text(chat_id, messages::PHOTO_NOT_FOUND).await?;
            return Ok(());
        };

        let opts = self.parse_options(&cmd.args, cmd.is_cover());
        self.previews
            .update(chat_id, user_id, |st| {
                apply_parsed(st, &opts);
                st.photo_ref = Some(first);
                st.awaiting_photo = false;
                st.menu = Submenu::Main;
            })
            .await;
        self.render_wizard(chat_id, user_id, true).await
    }

    /// Show the wizard panel, editing the existing one when asked and possible
    pub(super) async fn render_wizard(&self, chat_id: i64, user_id: i64, edit: bool) -> Result<()> {
        let st = self.previews.get(chat_id, user_id).await;
        debug!(%chat_id, %user_id, %edit, message_id = ?st.message_id, "render_wizard: called");
        let text = wizard::ui_text(&st, &self.catalog);
        let keyboard = wizard::keyboard(user_id, &st, &self.catalog);

        if edit && let Some(message_id) = st.message_id {
            match self
                .transport
                .edit_text_with_keyboard(chat_id, message_id, &text, &keyboard)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) if e.is_not_modified() => return Ok(()),
                Err(e) => debug!(error = %e, "render_wizard: edit failed, sending new panel"),
            }
        }

        let message_id = self.transport.send_text_with_keyboard(chat_id, &text, &keyboard).await?;
        self.previews
            .update(chat_id, user_id, |st| st.message_id = Some(message_id))
            .await;
        Ok(())
    }

    async fn answer(&self, callback_id: &str, text: &str, show_alert: bool) {
        if let Err(e) = self.transport.answer_callback(callback_id, text, show_alert).await {
            debug!(%callback_id, error = %e, "answer: failed");
        }
    }

    /// Handle a wizard button press
    pub(super) async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        debug!(callback_id = %query.id, data = ?query.data, "handle_callback: called");
        let Some(panel) = query.message.as_ref() else {
            return Ok(());
        };
        let Some(callback) = query.data.as_deref().and_then(wizard::parse_callback) else {
            debug!("handle_callback: not a wizard callback");
            return Ok(());
        };
        if callback.owner != query.from.id {
            debug!(owner = callback.owner, from = query.from.id, "handle_callback: foreign user");
            self.answer(&query.id, messages::NOT_YOUR_MENU, true).await;
            return Ok(());
        }

        let chat_id = panel.chat.id;
        let owner = callback.owner;
        let action = callback.action;
        let updated = self
            .previews
            .update(chat_id, owner, |st| {
                st.message_id = Some(panel.message_id);
                action.apply(st);
            })
            .await;

        match action {
            WizardAction::Note => {
                self.answer(&query.id, messages::NOTE_REQUEST_ANSWER, false).await;
                self.notify(chat_id, messages::NOTE_REQUEST).await;
            }
            WizardAction::Prompt => {
                self.answer(&query.id, messages::PROMPT_SENDING, false).await;
                let request = synthesize(&updated.prompt_options(&self.catalog), &self.catalog);
                self.notify(chat_id, &request.document).await;
            }
            WizardAction::Generate => {
                self.answer(&query.id, messages::GENERATING, false).await;
                match updated.photo_ref.clone().filter(|p| !p.trim().is_empty()) {
                    Some(photo_ref) => self.generate_preview(chat_id, owner, &photo_ref).await?,
                    None => {
                        self.previews
                            .update(chat_id, owner, |st| st.awaiting_photo = true)
                            .await;
                        self.notify(chat_id, messages::PHOTO_REQUEST).await;
                    }
                }
            }
            _ => self.answer(&query.id, messages::CALLBACK_OK, false).await,
        }

        self.render_wizard(chat_id, owner, true).await
    }

    /// Synthesize from the wizard state and ask the backend for preview images
    pub(super) async fn generate_preview(&self, chat_id: i64, user_id: i64, photo_ref: &str) -> Result<()> {
        debug!(%chat_id, %user_id, %photo_ref, "generate_preview: called");
        let st = self.previews.get(chat_id, user_id).await;
        let opts = st.prompt_options(&self.catalog);
        let request = synthesize(&opts, &self.catalog);

        self.typing(chat_id).await;
        self.notify(chat_id, &messages::preview_in_progress(request.shape.count)).await;

        let (bytes, mime) = match self.transport.download_file(photo_ref).await {
            Ok(file) => file,
            Err(e) => {
                error!(%chat_id, error = %e, "Preview photo download failed");
                self.transport.send_text(chat_id, messages::DOWNLOAD_FAILED).await?;
                return Ok(());
            }
        };

        let images = [ImageInput::from_bytes(&mime, &bytes)];
        let chat_opts = ChatOptions {
            want_image: true,
            aspect_ratio: Some(request.shape.aspect_ratio.clone()),
        };
        let resp = match self.backend.chat(&[], &request.document, &images, &chat_opts).await {
            Ok(resp) => resp,
            Err(e) => {
                error!(%chat_id, error = %e, "Preview generation failed");
                self.transport.send_text(chat_id, messages::PREVIEW_FAILED).await?;
                return Ok(());
            }
        };
        if resp.images.is_empty() {
            warn!(%chat_id, "Preview generation returned no images");
            self.transport.send_text(chat_id, messages::PREVIEW_NO_IMAGES).await?;
            return Ok(());
        }

        let photo_ref = photo_ref.to_string();
        self.previews
            .update(chat_id, user_id, |st| {
                st.photo_ref = Some(photo_ref);
                st.awaiting_photo = false;
                st.menu = Submenu::Main;
            })
            .await;

        info!(%chat_id, images = resp.images.len(), layout = %request.shape.layout_key, "Preview generated");
        let caption = messages::preview_ready(resp.images.len(), opts.style.as_deref(), opts.category.as_deref());
        self.send_response(
            chat_id,
            &GenerationResponse {
                text: caption,
                images: resp.images,
            },
            true,
        )
        .await
    }
}
