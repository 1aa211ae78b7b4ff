//! Local filesystem document store
//!
//! Files live under `<root>/<submission_id>/<index>_<filename>`. Storage
//! paths handed out are relative to the root.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::error::{Error, Result};

use super::document_store::DocumentStoreProvider;

/// Local document store using filesystem
pub struct LocalDocumentStore {
    /// Directory to store documents
    storage_dir: PathBuf,
}

impl LocalDocumentStore {
    /// Create a new local document store
    pub fn new(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.storage_dir
    }

    /// Resolve a storage path, refusing anything that leaves the root
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(Error::storage(format!("Invalid storage path: {}", path)));
        }
        Ok(self.storage_dir.join(relative))
    }
}

/// Reduce a client-supplied filename to a safe single path component
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl DocumentStoreProvider for LocalDocumentStore {
    async fn store(
        &self,
        submission_id: &Uuid,
        index: usize,
        filename: &str,
        data: &[u8],
    ) -> Result<String> {
        let relative = format!("{}/{}_{}", submission_id, index, sanitize_filename(filename));
        let full_path = self.storage_dir.join(&relative);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, data).await.map_err(|e| {
            Error::storage(format!("Failed to write {}: {}", full_path.display(), e))
        })?;

        tracing::debug!("Stored {} ({} bytes) at {}", filename, data.len(), relative);
        Ok(relative)
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| Error::storage(format!("Failed to read {}: {}", path, e)))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(tokio::fs::metadata(&self.storage_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    fn name(&self) -> &str {
        "local-fs"
    }
}
