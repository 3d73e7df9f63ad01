//! Shared key generation for document storage.
//!
//! Key format: `{bucket_prefix}/{report_id}/{timestamp_ms}_{filename}`.
//! The filename must already be sanitized by the caller.

use chrono::Utc;
use uuid::Uuid;

/// Logical bucket a document belongs to, expressed as a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentBucket {
    /// Letter scans attached at intake.
    OriginalReports,
    /// First-pass work files from staff.
    Documents,
    /// Revised work files; served only through presigned URLs.
    RevisedDocuments,
}

impl DocumentBucket {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentBucket::OriginalReports => "original_reports",
            DocumentBucket::Documents => "documents",
            DocumentBucket::RevisedDocuments => "revised_documents",
        }
    }

    /// Whether objects under this prefix are publicly readable. Revised
    /// documents are not; they require a presigned URL.
    pub fn is_public(&self) -> bool {
        !matches!(self, DocumentBucket::RevisedDocuments)
    }
}

/// Generate the storage key for a document.
pub fn document_key(bucket: DocumentBucket, report_id: Uuid, filename: &str) -> String {
    format!(
        "{}/{}/{}_{}",
        bucket.prefix(),
        report_id,
        Utc::now().timestamp_millis(),
        filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_layout() {
        let id = Uuid::new_v4();
        let key = document_key(DocumentBucket::Documents, id, "laporan.pdf");
        assert!(key.starts_with(&format!("documents/{}/", id)));
        assert!(key.ends_with("_laporan.pdf"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_revised_documents_not_public() {
        assert!(DocumentBucket::OriginalReports.is_public());
        assert!(DocumentBucket::Documents.is_public());
        assert!(!DocumentBucket::RevisedDocuments.is_public());
    }
}
