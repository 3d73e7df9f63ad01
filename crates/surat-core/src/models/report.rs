use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::double_option;

/// Report (letter) status.
///
/// Canonical set. The legacy strings `forwarded-to-tu` and `returned` found in
/// older rows are accepted by [`ReportStatus::parse`] as aliases and are never
/// written back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "report_status", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Draft,
    InProgress,
    RevisionRequired,
    ForwardedToCoordinator,
    PendingApprovalTu,
    Completed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::InProgress => "in-progress",
            ReportStatus::RevisionRequired => "revision-required",
            ReportStatus::ForwardedToCoordinator => "forwarded-to-coordinator",
            ReportStatus::PendingApprovalTu => "pending-approval-tu",
            ReportStatus::Completed => "completed",
        }
    }

    /// Parse a stored or client-supplied status string, accepting legacy aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ReportStatus::Draft),
            "in-progress" => Some(ReportStatus::InProgress),
            "revision-required" => Some(ReportStatus::RevisionRequired),
            "forwarded-to-coordinator" => Some(ReportStatus::ForwardedToCoordinator),
            "pending-approval-tu" => Some(ReportStatus::PendingApprovalTu),
            "completed" | "selesai" => Some(ReportStatus::Completed),
            // Legacy aliases from pre-refactor rows
            "forwarded-to-tu" => Some(ReportStatus::PendingApprovalTu),
            "returned" => Some(ReportStatus::Draft),
            _ => None,
        }
    }

    /// Permissive coercion used on create: unrecognized or missing values
    /// default to `draft` rather than being rejected.
    pub fn coerce(s: Option<&str>) -> Self {
        s.and_then(Self::parse).unwrap_or(ReportStatus::Draft)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report priority. Unrecognized values coerce to `sedang`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "report_priority", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Rendah,
    Sedang,
    Tinggi,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rendah" => Some(Priority::Rendah),
            "sedang" => Some(Priority::Sedang),
            "tinggi" => Some(Priority::Tinggi),
            _ => None,
        }
    }

    pub fn coerce(s: Option<&str>) -> Self {
        s.and_then(Self::parse).unwrap_or(Priority::Sedang)
    }
}

/// Report entity: one incoming letter/document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Report {
    pub id: Uuid,
    pub no_surat: String,
    pub hal: String,
    pub layanan: String,
    pub sub_layanan: Option<String>,
    pub dari: String,
    pub tanggal_surat: Option<String>,
    pub tanggal_agenda: Option<String>,
    pub no_agenda: Option<String>,
    pub kelompok_asal_surat: Option<String>,
    pub agenda_sestama: Option<String>,
    pub link_documents: Option<String>,
    pub sifat: Vec<String>,
    pub derajat: Vec<String>,
    pub status: ReportStatus,
    pub priority: Priority,
    pub created_by: Uuid,
    pub current_holder: Option<Uuid>,
    pub coordinator_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Human-readable tracking number derived from the report id.
    pub fn tracking_number(&self) -> String {
        tracking_number(self.id)
    }
}

/// Derive the public tracking number from a report id: `TRK-` plus the first
/// eight hex characters of the UUID, uppercased.
pub fn tracking_number(id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("TRK-{}", simple[..8].to_uppercase())
}

/// Fields for inserting a new report. Status and priority are already coerced.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub no_surat: String,
    pub hal: String,
    pub layanan: String,
    pub sub_layanan: Option<String>,
    pub dari: String,
    pub tanggal_surat: Option<String>,
    pub tanggal_agenda: Option<String>,
    pub no_agenda: Option<String>,
    pub kelompok_asal_surat: Option<String>,
    pub agenda_sestama: Option<String>,
    pub link_documents: Option<String>,
    pub sifat: Vec<String>,
    pub derajat: Vec<String>,
    pub status: ReportStatus,
    pub priority: Priority,
    pub created_by: Uuid,
    pub current_holder: Option<Uuid>,
}

/// Partial update of a report.
///
/// Tri-state merge contract: a field that is absent from the payload is left
/// alone, an explicit `null` clears the column, and a value replaces it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub no_surat: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hal: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub layanan: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", alias = "sub_layanan")]
    pub sub_layanan: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub dari: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tanggal_surat: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tanggal_agenda: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub no_agenda: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub kelompok_asal_surat: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub agenda_sestama: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub link_documents: Option<Option<String>>,
    #[serde(default)]
    pub sifat: Option<Vec<String>>,
    #[serde(default)]
    pub derajat: Option<Vec<String>>,
    /// Raw status string; validated against the transition table before writing.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub coordinator_id: Option<Uuid>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        self.no_surat.is_none()
            && self.hal.is_none()
            && self.layanan.is_none()
            && self.sub_layanan.is_none()
            && self.dari.is_none()
            && self.tanggal_surat.is_none()
            && self.tanggal_agenda.is_none()
            && self.no_agenda.is_none()
            && self.kelompok_asal_surat.is_none()
            && self.agenda_sestama.is_none()
            && self.link_documents.is_none()
            && self.sifat.is_none()
            && self.derajat.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.coordinator_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_coerce_defaults_to_draft() {
        assert_eq!(ReportStatus::coerce(None), ReportStatus::Draft);
        assert_eq!(ReportStatus::coerce(Some("nonsense")), ReportStatus::Draft);
        assert_eq!(
            ReportStatus::coerce(Some("in-progress")),
            ReportStatus::InProgress
        );
    }

    #[test]
    fn test_status_legacy_aliases() {
        assert_eq!(
            ReportStatus::parse("forwarded-to-tu"),
            Some(ReportStatus::PendingApprovalTu)
        );
        assert_eq!(ReportStatus::parse("returned"), Some(ReportStatus::Draft));
        assert_eq!(
            ReportStatus::parse("Selesai"),
            Some(ReportStatus::Completed)
        );
    }

    #[test]
    fn test_priority_coerce_defaults_to_sedang() {
        assert_eq!(Priority::coerce(None), Priority::Sedang);
        assert_eq!(Priority::coerce(Some("urgent")), Priority::Sedang);
        assert_eq!(Priority::coerce(Some("tinggi")), Priority::Tinggi);
    }

    #[test]
    fn test_tracking_number_shape() {
        let id = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        assert_eq!(tracking_number(id), "TRK-A1B2C3D4");
    }

    #[test]
    fn test_patch_tri_state_merge() {
        // absent -> None, null -> Some(None), value -> Some(Some(v))
        let patch: ReportPatch =
            serde_json::from_str(r#"{"hal": "Updated", "noAgenda": null}"#).unwrap();
        assert_eq!(patch.hal, Some(Some("Updated".to_string())));
        assert_eq!(patch.no_agenda, Some(None));
        assert_eq!(patch.no_surat, None);
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_accepts_snake_case_sub_layanan() {
        let patch: ReportPatch = serde_json::from_str(r#"{"sub_layanan": "Arsip"}"#).unwrap();
        assert_eq!(patch.sub_layanan, Some(Some("Arsip".to_string())));
    }
}
