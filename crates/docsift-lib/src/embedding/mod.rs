pub mod local;
pub mod openai;

use async_trait::async_trait;

/// Produces fixed-dimension embedding vectors for text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
