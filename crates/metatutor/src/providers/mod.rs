//! Provider traits for embeddings and text generation

pub mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Trait for black-box text generation.
///
/// Implementations bound their own output length; callers must not treat the
/// result as carrying calibrated confidence.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate a bounded-length completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
