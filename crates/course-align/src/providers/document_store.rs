//! Document store provider trait for uploaded course files

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Trait for course file storage
///
/// Implementations:
/// - `LocalDocumentStore`: local filesystem
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Store one uploaded file
    ///
    /// `index` is the file's position within the upload. Returns the storage
    /// path to record on the submission.
    async fn store(
        &self,
        submission_id: &Uuid,
        index: usize,
        filename: &str,
        data: &[u8],
    ) -> Result<String>;

    /// Retrieve a stored file by storage path
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
