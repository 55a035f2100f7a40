use async_trait::async_trait;

use super::error::StorageError;

/// Content type used for every artifact this service uploads.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Key-addressed blob storage that hands out public URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key` and return the object's public URL.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, StorageError>;
}
