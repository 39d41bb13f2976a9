//! Pro Banana - product preview bot
//!
//! A chat bot that takes product photos and turns them into generated preview
//! images. Users pick a layout, category, style, and frame templates through
//! an inline wizard; the bot synthesizes a generation document from that
//! selection and sends it with the photo to a generative backend.
//!
//! # Modules
//!
//! - [`catalog`] - static categories, styles, and frame templates
//! - [`preview`] - layouts, selection state machine, prompt synthesis
//! - [`mediagroup`] - debounce aggregation of album photos
//! - [`session`] - bounded per-user chat history
//! - [`gemini`] - generation backend trait and HTTP client
//! - [`telegram`] - chat transport trait and Bot API client
//! - [`handlers`] - update routing and the preview wizard
//! - [`bot`] - polling loop, concurrency limit, shutdown
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod bot;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod gemini;
pub mod handlers;
pub mod httpclient;
pub mod media;
pub mod mediagroup;
pub mod preview;
pub mod session;
pub mod telegram;

pub use bot::Bot;
pub use catalog::{Catalog, Category, FrameTemplate, Style};
pub use config::Config;
pub use gemini::{GeminiClient, GenerationBackend, GenerationError};
pub use handlers::Handler;
pub use mediagroup::{Aggregator, MediaGroup, MediaItem};
pub use preview::{FrameSelection, GenerationRequest, OutputShape, PreviewState, PreviewStore, PromptOptions};
pub use session::SessionStore;
pub use telegram::{ChatTransport, TelegramClient, TransportError};
