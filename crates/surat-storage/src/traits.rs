//! Storage abstraction trait implemented by all document backends.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::keys::DocumentBucket;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Document storage backend.
///
/// The repositories record storage keys; handlers use this trait to move
/// bytes and to mint URLs. Presigned URLs are only issued for the
/// revised-documents prefix; everything else gets a stable public URL.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a document and return (storage_key, url).
    ///
    /// The url is public for public buckets; for the revised-documents
    /// bucket it is the storage key's canonical URL, which still requires
    /// presigning to read.
    async fn upload(
        &self,
        bucket: DocumentBucket,
        report_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Generate a presigned GET URL for direct access.
    ///
    /// The expiry is clamped to the 60 s – 3600 s window.
    async fn presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

/// Bounds for presigned URL lifetimes.
pub const PRESIGN_MIN: Duration = Duration::from_secs(60);
pub const PRESIGN_MAX: Duration = Duration::from_secs(3600);

/// Clamp a requested presign expiry into the allowed window.
pub fn clamp_presign_expiry(requested: Duration) -> Duration {
    requested.clamp(PRESIGN_MIN, PRESIGN_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presign_expiry_clamped() {
        assert_eq!(clamp_presign_expiry(Duration::from_secs(5)), PRESIGN_MIN);
        assert_eq!(
            clamp_presign_expiry(Duration::from_secs(7200)),
            PRESIGN_MAX
        );
        assert_eq!(
            clamp_presign_expiry(Duration::from_secs(300)),
            Duration::from_secs(300)
        );
    }
}
