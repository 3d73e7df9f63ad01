use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata row for an uploaded file tied to a report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileAttachment {
    pub id: Uuid,
    pub report_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Attachment entry as sent by clients in report create/update payloads.
///
/// Clients historically used several key spellings for the same fields, so
/// both camelCase and snake_case are accepted. Entries without a resolvable
/// URL are skipped on insert.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    #[serde(default, alias = "file_name", alias = "name")]
    pub file_name: Option<String>,
    #[serde(default, alias = "file_url", alias = "url")]
    pub file_url: Option<String>,
    #[serde(default, alias = "file_type", alias = "type")]
    pub file_type: Option<String>,
    #[serde(default, alias = "file_size", alias = "size")]
    pub file_size: Option<i64>,
}

impl AttachmentPayload {
    /// Resolved name, falling back to the generic label used by the intake UI.
    pub fn resolved_name(&self) -> String {
        self.file_name
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Lampiran".to_string())
    }

    pub fn resolved_url(&self) -> Option<&str> {
        self.file_url.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accepts_aliases() {
        let p: AttachmentPayload =
            serde_json::from_str(r#"{"name": "a.pdf", "url": "https://x/a.pdf", "size": 12}"#)
                .unwrap();
        assert_eq!(p.resolved_name(), "a.pdf");
        assert_eq!(p.resolved_url(), Some("https://x/a.pdf"));
        assert_eq!(p.file_size, Some(12));
    }

    #[test]
    fn test_payload_without_url_is_skippable() {
        let p: AttachmentPayload = serde_json::from_str(r#"{"fileName": "b.pdf"}"#).unwrap();
        assert_eq!(p.resolved_url(), None);
        assert_eq!(p.resolved_name(), "b.pdf");
    }

    #[test]
    fn test_payload_missing_name_falls_back() {
        let p: AttachmentPayload =
            serde_json::from_str(r#"{"fileUrl": "https://x/c.pdf"}"#).unwrap();
        assert_eq!(p.resolved_name(), "Lampiran");
    }
}
