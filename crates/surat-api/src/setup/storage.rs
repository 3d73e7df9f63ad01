//! Object storage setup.

use anyhow::{Context, Result};
use std::sync::Arc;
use surat_core::Config;
use surat_storage::{S3Storage, Storage};

/// Build the S3 storage backend from configuration. Credentials come from
/// the standard AWS environment variables.
pub fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(
        bucket = %config.s3_bucket,
        region = %config.s3_region,
        endpoint = ?config.s3_endpoint,
        "Initializing object storage"
    );

    let storage = S3Storage::new(
        config.s3_bucket.clone(),
        config.s3_region.clone(),
        config.s3_endpoint.clone(),
    )
    .context("Failed to initialize S3 storage")?;

    Ok(Arc::new(storage))
}
