use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Task assignment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "task_status", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    InProgress,
    RevisionRequired,
    PendingReview,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in-progress",
            TaskStatus::RevisionRequired => "revision-required",
            TaskStatus::PendingReview => "pending-review",
            TaskStatus::Completed => "completed",
        }
    }

    /// An assignment counts toward coordinator-forward eligibility once it is
    /// completed or waiting on coordinator review.
    pub fn is_settled(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::PendingReview)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One staff member's work item against a report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TaskAssignment {
    pub id: Uuid,
    pub report_id: Uuid,
    /// Profile id of the assigned staff member.
    pub staff_id: Uuid,
    /// Profile id of the coordinator who assigned it.
    pub coordinator_id: Uuid,
    pub todo_list: Vec<String>,
    /// Coordinator's initial instructions.
    pub notes: Option<String>,
    pub status: TaskStatus,
    pub completed_tasks: Vec<String>,
    pub progress: i32,
    /// Storage key of the first-pass work file (documents bucket).
    pub file_path: Option<String>,
    /// Storage key of the revised file (revised_documents bucket).
    pub revised_file_path: Option<String>,
    pub staff_notes: Option<String>,
    pub staff_revision_notes: Option<String>,
    /// Coordinator's revision instructions when work is rejected.
    pub revision_notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_statuses() {
        assert!(TaskStatus::Completed.is_settled());
        assert!(TaskStatus::PendingReview.is_settled());
        assert!(!TaskStatus::InProgress.is_settled());
        assert!(!TaskStatus::RevisionRequired.is_settled());
    }

    #[test]
    fn test_status_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::PendingReview).unwrap(),
            "\"pending-review\""
        );
        let s: TaskStatus = serde_json::from_str("\"revision-required\"").unwrap();
        assert_eq!(s, TaskStatus::RevisionRequired);
    }
}
