//! Reference framework sections

use serde::{Deserialize, Serialize};

/// A section of the reference framework with its vector representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkChunk {
    /// Stable identifier (e.g. `assessment_portfolio_001`)
    #[serde(alias = "chunk_id")]
    pub id: String,
    /// Category label; findings are deduplicated on this
    pub category: String,
    /// Section title, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Section text
    pub content: String,
    /// Embedding vector; empty until vectorized
    #[serde(default)]
    pub embedding: Vec<f32>,
    /// Similarity precomputed by a search, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    /// Intended audience level (e.g. Universal, Facilitator)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub educational_level: Option<String>,
    /// Kind of content (e.g. philosophy, assessment_method)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FrameworkChunk {
    /// Create a chunk with no embedding
    pub fn new(id: impl Into<String>, category: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            title: None,
            content: content.into(),
            embedding: Vec::new(),
            similarity: None,
            educational_level: None,
            content_type: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the embedding
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Set a precomputed similarity
    pub fn with_similarity(mut self, similarity: f32) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Whether the chunk still needs an embedding
    pub fn is_pending(&self) -> bool {
        self.embedding.is_empty()
    }

    /// Title for display; falls back to "<category> Alignment"
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => format!("{} Alignment", self.category),
        }
    }
}
