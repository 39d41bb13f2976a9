//! ChatTransport trait definition

use async_trait::async_trait;

use super::{InlineKeyboardMarkup, TransportError, Update, User};

/// Outbound and inbound operations of the chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_typing(&self, chat_id: i64) -> Result<(), TransportError>;

    /// Send text, split into as many messages as the size limit requires
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    /// Send a photo given as a `data:` URL (a bare payload is taken as JPEG)
    async fn send_photo_data_url(&self, chat_id: i64, data_url: &str, caption: &str) -> Result<(), TransportError>;

    /// Send text with an inline keyboard and return the new message id
    async fn send_text_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<i64, TransportError>;

    async fn edit_text_with_keyboard(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<(), TransportError>;

    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), TransportError>;

    /// Download a file by id, returning its bytes and content type
    async fn download_file(&self, file_id: &str) -> Result<(Vec<u8>, String), TransportError>;

    /// Long-poll for updates after `offset`
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TransportError>;

    async fn get_me(&self) -> Result<User, TransportError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tracing::debug;

    /// Everything the mock was asked to send
    #[derive(Debug, Clone, PartialEq)]
    pub enum Sent {
        Typing {
            chat_id: i64,
        },
        Text {
            chat_id: i64,
            text: String,
        },
        Photo {
            chat_id: i64,
            data_url: String,
            caption: String,
        },
        Keyboard {
            chat_id: i64,
            message_id: i64,
            text: String,
            keyboard: InlineKeyboardMarkup,
        },
        Edit {
            chat_id: i64,
            message_id: i64,
            text: String,
            keyboard: InlineKeyboardMarkup,
        },
        CallbackAnswer {
            callback_id: String,
            text: String,
            show_alert: bool,
        },
    }

    /// In-memory transport for handler tests
    pub struct MockTransport {
        sent: Mutex<Vec<Sent>>,
        files: Mutex<HashMap<String, (Vec<u8>, String)>>,
        updates: Mutex<VecDeque<Vec<Update>>>,
        next_message_id: AtomicI64,
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            debug!("MockTransport::new: called");
            Self {
                sent: Mutex::new(Vec::new()),
                files: Mutex::new(HashMap::new()),
                updates: Mutex::new(VecDeque::new()),
                next_message_id: AtomicI64::new(100),
            }
        }

        /// Register a downloadable file
        pub fn with_file(self, file_id: &str, bytes: &[u8], mime: &str) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(file_id.to_string(), (bytes.to_vec(), mime.to_string()));
            self
        }

        pub fn queue_updates(&self, updates: Vec<Update>) {
            self.updates.lock().unwrap().push_back(updates);
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        /// Plain text messages in send order
        pub fn texts(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Text { text, .. } => Some(text),
                    _ => None,
                })
                .collect()
        }

        /// Photo captions in send order
        pub fn photo_captions(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Photo { caption, .. } => Some(caption),
                    _ => None,
                })
                .collect()
        }

        /// The most recent keyboard message or edit, as (text, keyboard)
        pub fn last_menu(&self) -> Option<(String, InlineKeyboardMarkup)> {
            self.sent().into_iter().rev().find_map(|s| match s {
                Sent::Keyboard { text, keyboard, .. } | Sent::Edit { text, keyboard, .. } => Some((text, keyboard)),
                _ => None,
            })
        }

        pub fn callback_answers(&self) -> Vec<(String, bool)> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::CallbackAnswer { text, show_alert, .. } => Some((text, show_alert)),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, sent: Sent) {
            self.sent.lock().unwrap().push(sent);
        }
    }

    #[async_trait]
    impl ChatTransport for MockTransport {
        async fn send_typing(&self, chat_id: i64) -> Result<(), TransportError> {
            self.record(Sent::Typing { chat_id });
            Ok(())
        }

        async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
            self.record(Sent::Text {
                chat_id,
                text: text.to_string(),
            });
            Ok(())
        }

        async fn send_photo_data_url(&self, chat_id: i64, data_url: &str, caption: &str) -> Result<(), TransportError> {
            self.record(Sent::Photo {
                chat_id,
                data_url: data_url.to_string(),
                caption: caption.to_string(),
            });
            Ok(())
        }

        async fn send_text_with_keyboard(
            &self,
            chat_id: i64,
            text: &str,
            keyboard: &InlineKeyboardMarkup,
        ) -> Result<i64, TransportError> {
            let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
            self.record(Sent::Keyboard {
                chat_id,
                message_id,
                text: text.to_string(),
                keyboard: keyboard.clone(),
            });
            Ok(message_id)
        }

        async fn edit_text_with_keyboard(
            &self,
            chat_id: i64,
            message_id: i64,
            text: &str,
            keyboard: &InlineKeyboardMarkup,
        ) -> Result<(), TransportError> {
            self.record(Sent::Edit {
                chat_id,
                message_id,
                text: text.to_string(),
                keyboard: keyboard.clone(),
            });
            Ok(())
        }

        async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), TransportError> {
            self.record(Sent::CallbackAnswer {
                callback_id: callback_id.to_string(),
                text: text.to_string(),
                show_alert,
            });
            Ok(())
        }

        async fn download_file(&self, file_id: &str) -> Result<(Vec<u8>, String), TransportError> {
            self.files
                .lock()
                .unwrap()
                .get(file_id)
                .cloned()
                .ok_or_else(|| TransportError::Download {
                    status: 404,
                    message: format!("no such file {}", file_id),
                })
        }

        async fn get_updates(&self, _offset: i64, _timeout_secs: u64) -> Result<Vec<Update>, TransportError> {
            Ok(self.updates.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn get_me(&self) -> Result<User, TransportError> {
            Ok(User {
                id: 1,
                is_bot: true,
                first_name: "Pro Banana".to_string(),
                username: Some("probanana_bot".to_string()),
            })
        }
    }
}
