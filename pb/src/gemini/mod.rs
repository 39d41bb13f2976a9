//! Generation backend
//!
//! The [`GenerationBackend`] trait is what handlers talk to;
//! [`GeminiClient`] implements it over the Gemini REST API.

mod backend;
mod client;
mod error;
mod types;

pub use backend::GenerationBackend;
#[cfg(test)]
pub use backend::mock;
pub use client::GeminiClient;
pub use error::GenerationError;
pub use types::{ChatOptions, GenerationResponse, ImageInput};
