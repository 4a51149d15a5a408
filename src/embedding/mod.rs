//! Embedding generation for semantic search and course-name resolution.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::config::EmbeddingSettings;
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder named by `settings.provider`.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    match settings.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
        ))),
        other => Err(SyllabusError::Config(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}
