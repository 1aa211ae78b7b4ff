//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations:
/// - `HuggingFaceEmbedder`: hosted feature-extraction pipeline
/// - `DisabledEmbedder`: always fails, forcing the keyword-only path
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get embedding dimensions (384 for all-MiniLM-L6-v2)
    fn dimensions(&self) -> usize;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Provider used when no embedding service is configured
pub struct DisabledEmbedder {
    dimensions: usize,
}

impl DisabledEmbedder {
    /// Create a disabled provider reporting the given dimensions
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for DisabledEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("embedding service is not configured"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        // Nothing to reach; the keyword path is always available
        Ok(true)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
