//! GenerationBackend trait definition

use async_trait::async_trait;

use super::{ChatOptions, GenerationError, GenerationResponse, ImageInput};
use crate::session::HistoryMessage;

/// A multimodal generation backend
///
/// Calls are independent; conversation history is passed in by the caller.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send a prompt with optional images and prior history
    async fn chat(
        &self,
        history: &[HistoryMessage],
        prompt: &str,
        images: &[ImageInput],
        opts: &ChatOptions,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Generate images from text alone
    async fn generate_image(&self, prompt: &str) -> Result<GenerationResponse, GenerationError>;
}
