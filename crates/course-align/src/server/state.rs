//! Application state for the alignment server

use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;

use crate::classification::{ClassificationEngine, JitterSource, RandomJitter};
use crate::config::AlignConfig;
use crate::error::Result;
use crate::framework::FrameworkIndex;
use crate::providers::{
    DisabledEmbedder, DocumentStoreProvider, EmbeddingProvider, HuggingFaceEmbedder,
    LocalDocumentStore,
};
use crate::storage::SubmissionDb;
use crate::types::FrameworkChunk;

/// Explicit collaborators handed to the server
pub struct Collaborators {
    /// Embedding provider
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Uploaded file storage
    pub documents: Arc<dyn DocumentStoreProvider>,
    /// Submission and analysis persistence
    pub db: Arc<SubmissionDb>,
    /// Reference framework
    pub framework: FrameworkIndex,
    /// Randomness for the keyword-only estimate
    pub jitter: Box<dyn JitterSource>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AlignConfig,
    /// Classification engine
    engine: ClassificationEngine,
    /// Embedding provider (Hugging Face or disabled)
    embedder: Arc<dyn EmbeddingProvider>,
    /// Document store for uploaded files
    documents: Arc<dyn DocumentStoreProvider>,
    /// Submission database
    db: Arc<SubmissionDb>,
    /// Framework index
    framework: RwLock<FrameworkIndex>,
    /// Jitter source; only locked for the synchronous classify call
    jitter: Mutex<Box<dyn JitterSource>>,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Build state with the default collaborators for `config`
    pub async fn new(config: AlignConfig) -> Result<Self> {
        tracing::info!("Initializing course alignment state...");

        let embedder: Arc<dyn EmbeddingProvider> = match config.embeddings.api_key() {
            Some(key) => {
                tracing::info!(
                    "Embedding provider: Hugging Face ({})",
                    config.embeddings.model
                );
                Arc::new(HuggingFaceEmbedder::with_api_key(&config.embeddings, Some(key))?)
            }
            None => {
                tracing::warn!(
                    "{} is not set; scores will use the keyword-only estimate",
                    config.embeddings.api_key_env
                );
                Arc::new(DisabledEmbedder::new(config.embeddings.dimensions))
            }
        };

        let documents = Arc::new(LocalDocumentStore::new(config.storage.documents_dir.clone())?);
        tracing::info!("Document store at {}", config.storage.documents_dir.display());

        let db = Arc::new(SubmissionDb::new(&config.storage.database_path)?);
        tracing::info!("Database at {}", config.storage.database_path.display());

        let (framework, framework_loaded) = match FrameworkIndex::load(&config.framework.chunks_path) {
            Ok(index) => (index, true),
            Err(e) => {
                tracing::warn!("Framework not loaded ({}); every analysis will report limited alignment", e);
                (FrameworkIndex::default(), false)
            }
        };
        if !framework.pending().is_empty() {
            tracing::warn!(
                "{} framework chunks have no embedding; run course-align-vectorize",
                framework.pending().len()
            );
        }

        let state = Self::with_collaborators(
            config,
            Collaborators {
                embedder,
                documents,
                db,
                framework,
                jitter: Box::new(RandomJitter::from_entropy()),
            },
        );

        // Serve uploads either way, but report not ready without a framework
        state.set_ready(framework_loaded);
        Ok(state)
    }

    /// Build state from explicit collaborators
    pub fn with_collaborators(config: AlignConfig, collaborators: Collaborators) -> Self {
        let engine = ClassificationEngine::new(config.classification.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                embedder: collaborators.embedder,
                documents: collaborators.documents,
                db: collaborators.db,
                framework: RwLock::new(collaborators.framework),
                jitter: Mutex::new(collaborators.jitter),
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AlignConfig {
        &self.inner.config
    }

    /// Get classification engine
    pub fn engine(&self) -> &ClassificationEngine {
        &self.inner.engine
    }

    /// Get embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get document store
    pub fn documents(&self) -> &Arc<dyn DocumentStoreProvider> {
        &self.inner.documents
    }

    /// Get submission database
    pub fn db(&self) -> &Arc<SubmissionDb> {
        &self.inner.db
    }

    /// Search the framework with the configured threshold and count
    pub fn search_framework(&self, embedding: &[f32]) -> Vec<FrameworkChunk> {
        let config = &self.inner.config.framework;
        self.inner
            .framework
            .read()
            .search(embedding, config.match_threshold, config.match_count)
    }

    /// Number of framework chunks loaded
    pub fn framework_size(&self) -> usize {
        self.inner.framework.read().len()
    }

    /// Lock the jitter source; never hold the guard across an await
    pub fn jitter(&self) -> MutexGuard<'_, Box<dyn JitterSource>> {
        self.inner.jitter.lock()
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
