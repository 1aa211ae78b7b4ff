//! Collaborator abstractions for embeddings and document storage
//!
//! The server is built from explicit provider objects so tests and binaries
//! can swap implementations without touching the handlers.

pub mod document_store;
pub mod embedding;
pub mod huggingface;
pub mod local;

pub use document_store::DocumentStoreProvider;
pub use embedding::{DisabledEmbedder, EmbeddingProvider};
pub use huggingface::{normalize_embedding, HuggingFaceEmbedder};
pub use local::LocalDocumentStore;
