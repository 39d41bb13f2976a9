//! Chat transport
//!
//! Handlers talk to [`ChatTransport`]; [`TelegramClient`] implements it over
//! the Telegram Bot API.

mod client;
mod error;
mod text;
mod transport;
mod types;

pub use client::TelegramClient;
pub use error::TransportError;
pub use text::{MAX_CAPTION_BYTES, MAX_MESSAGE_BYTES, split_by_bytes, truncate_by_bytes};
pub use transport::ChatTransport;
#[cfg(test)]
pub use transport::mock;
pub use types::{CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, PhotoSize, Update, User};
