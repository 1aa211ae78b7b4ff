//! Reference framework corpus
//!
//! Holds the framework sections with their embeddings and answers nearest
//! section queries for a course embedding.

use std::cmp::Ordering;
use std::path::Path;

use crate::classification::cosine_similarity;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::FrameworkChunk;

/// In-memory framework index
#[derive(Debug, Clone, Default)]
pub struct FrameworkIndex {
    chunks: Vec<FrameworkChunk>,
}

impl FrameworkIndex {
    /// Create from chunks
    pub fn new(chunks: Vec<FrameworkChunk>) -> Self {
        Self { chunks }
    }

    /// Load chunks from a JSON array file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read framework file {}: {}", path.display(), e))
        })?;
        let chunks: Vec<FrameworkChunk> = serde_json::from_str(&raw)?;

        tracing::info!(
            "Loaded {} framework chunks from {} ({} without embeddings)",
            chunks.len(),
            path.display(),
            chunks.iter().filter(|c| c.is_pending()).count()
        );
        Ok(Self { chunks })
    }

    /// Write chunks back as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.chunks)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// All chunks
    pub fn chunks(&self) -> &[FrameworkChunk] {
        &self.chunks
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// IDs of chunks still missing an embedding
    pub fn pending(&self) -> Vec<&str> {
        self.chunks
            .iter()
            .filter(|c| c.is_pending())
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Chunks most similar to `query`, best first
    ///
    /// Keeps chunks with similarity `>= threshold`, at most `count` of them,
    /// each returned with `similarity` filled in. Chunks without embeddings
    /// are skipped.
    pub fn search(&self, query: &[f32], threshold: f32, count: usize) -> Vec<FrameworkChunk> {
        let mut scored: Vec<(&FrameworkChunk, f32)> = self
            .chunks
            .iter()
            .filter(|c| !c.is_pending())
            .map(|c| (c, cosine_similarity(query, &c.embedding)))
            .filter(|(_, similarity)| *similarity >= threshold)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(count);

        scored
            .into_iter()
            .map(|(chunk, similarity)| chunk.clone().with_similarity(similarity))
            .collect()
    }

    /// Embed every pending chunk; returns (embedded, failed)
    ///
    /// Individual failures are logged and skipped.
    pub async fn vectorize(&mut self, embedder: &dyn EmbeddingProvider) -> (usize, usize) {
        let mut embedded = 0;
        let mut failed = 0;

        for chunk in self.chunks.iter_mut().filter(|c| c.is_pending()) {
            match embedder.embed(&chunk.content).await {
                Ok(embedding) => {
                    if embedding.len() != embedder.dimensions() {
                        tracing::warn!(
                            "Chunk {} embedded with {} dimensions, expected {}",
                            chunk.id,
                            embedding.len(),
                            embedder.dimensions()
                        );
                    }
                    tracing::info!("Embedded framework chunk {}", chunk.id);
                    chunk.embedding = embedding;
                    embedded += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to embed framework chunk {}: {}", chunk.id, e);
                    failed += 1;
                }
            }
        }

        (embedded, failed)
    }
}
