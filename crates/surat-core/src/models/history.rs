use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Append-only audit record. Never updated or deleted; ordered by creation time.
///
/// `status` is recorded as the raw string in effect when the entry was written,
/// including task-level statuses like `pending-review`, so it stays TEXT rather
/// than the report status enum.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WorkflowHistoryEntry {
    pub id: Uuid,
    pub report_id: Uuid,
    pub action: String,
    pub user_id: Uuid,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// History action labels written by the workflow endpoints.
///
/// The public tracking timeline keys off several of these exact strings, so
/// they are centralized here rather than inlined at call sites.
pub mod actions {
    pub const REPORT_CREATED: &str = "Laporan dibuat";
    pub const FORWARDED_TO_COORDINATOR: &str = "Diteruskan ke Koordinator";
    pub const STAFF_ASSIGNED: &str = "Laporan ditugaskan";
    pub const WORK_SUBMITTED: &str = "Pekerjaan dikirim untuk review";
    pub const REVISION_REQUESTED: &str = "Revisi diminta";
    pub const REVISION_SUBMITTED: &str = "Revisi Selesai";
    pub const REVISIONS_APPROVED: &str = "Revisi Staff Disetujui";
    pub const FORWARDED_TO_TU: &str = "Pekerjaan Staff Disetujui & Diteruskan ke TU";
    pub const FINALIZED: &str = "Laporan diselesaikan oleh TU";
}
