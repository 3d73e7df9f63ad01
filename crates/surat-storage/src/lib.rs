//! Storage abstraction for report documents.
//!
//! Documents live in one S3/S3-compatible bucket under three logical
//! prefixes, mirroring the buckets the service replaced:
//!
//! - `original_reports/` — letter scans attached by TU at intake
//! - `documents/` — first-pass work files submitted by staff
//! - `revised_documents/` — revised work files; read access only via
//!   short-lived presigned URLs
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module.

pub(crate) mod keys;
pub mod s3;
pub mod traits;

pub use keys::{document_key, DocumentBucket};
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
