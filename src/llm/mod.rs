pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Generative text and image provider.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Single-prompt text completion; returns the raw model text.
    async fn complete_text(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generates one image and returns the provider-hosted (ephemeral) URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, LlmError>;
}
