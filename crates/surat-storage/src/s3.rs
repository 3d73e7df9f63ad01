use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{ObjectStore, PutPayload, Result as ObjectResult};
use std::time::Duration;
use uuid::Uuid;

use crate::keys::{document_key, DocumentBucket};
use crate::traits::{clamp_presign_expiry, Storage, StorageError, StorageResult};

/// S3/S3-compatible document storage.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance.
    ///
    /// Credentials come from the environment (`AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY`); `endpoint_url` points at S3-compatible
    /// providers such as MinIO or Supabase Storage's S3 gateway.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Public URL for an object.
    ///
    /// Path-style when a custom endpoint is configured, standard
    /// virtual-hosted AWS format otherwise.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        bucket: DocumentBucket,
        report_id: Uuid,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)> {
        let key = document_key(bucket, report_id, filename);
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.clone());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok((key, url))
    }

    async fn presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(storage_key.to_string());
        let expires_in = clamp_presign_expiry(expires_in);

        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(endpoint: Option<&str>) -> S3Storage {
        S3Storage::new(
            "surat-documents".to_string(),
            "ap-southeast-1".to_string(),
            endpoint.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_generate_url_aws() {
        let s = storage(None);
        assert_eq!(
            s.generate_url("documents/abc/1_x.pdf"),
            "https://surat-documents.s3.ap-southeast-1.amazonaws.com/documents/abc/1_x.pdf"
        );
    }

    #[test]
    fn test_generate_url_custom_endpoint_path_style() {
        let s = storage(Some("http://localhost:9000/"));
        assert_eq!(
            s.generate_url("original_reports/abc/1_x.pdf"),
            "http://localhost:9000/surat-documents/original_reports/abc/1_x.pdf"
        );
    }
}
