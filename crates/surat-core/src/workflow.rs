//! Report status transitions and derived projections.
//!
//! Every mutating endpoint consults [`validate_transition`] before touching
//! the database, so the legal status graph lives in exactly one place.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Report, ReportStatus, Role, TaskAssignment, TaskStatus};

/// A workflow action performed against a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    ForwardToCoordinator,
    AssignStaff,
    RequestRevision,
    ApproveRevisions,
    ForwardToTu,
    Finalize,
    Delete,
}

impl ReportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportAction::ForwardToCoordinator => "forward-to-coordinator",
            ReportAction::AssignStaff => "assign-staff",
            ReportAction::RequestRevision => "request-revision",
            ReportAction::ApproveRevisions => "approve-revisions",
            ReportAction::ForwardToTu => "forward-to-tu",
            ReportAction::Finalize => "finalize",
            ReportAction::Delete => "delete",
        }
    }

    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            ReportAction::ForwardToCoordinator => &[Role::Tu, Role::Admin],
            ReportAction::AssignStaff
            | ReportAction::RequestRevision
            | ReportAction::ApproveRevisions
            | ReportAction::ForwardToTu => &[Role::Koordinator, Role::Admin],
            ReportAction::Finalize | ReportAction::Delete => &[Role::Tu, Role::Admin],
        }
    }
}

/// Check that `role` may perform `action` on a report currently in `current`,
/// and return the status the report moves to.
///
/// `Delete` has no target status; it returns the current status unchanged and
/// callers just drop the row.
pub fn validate_transition(
    action: ReportAction,
    current: ReportStatus,
    role: Role,
) -> Result<ReportStatus, AppError> {
    if !action.allowed_roles().contains(&role) {
        return Err(AppError::Forbidden(format!(
            "role {} cannot perform {}",
            role,
            action.as_str()
        )));
    }

    let next = match (action, current) {
        (ReportAction::ForwardToCoordinator, ReportStatus::Draft) => {
            ReportStatus::ForwardedToCoordinator
        }
        (ReportAction::AssignStaff, ReportStatus::ForwardedToCoordinator)
        | (ReportAction::AssignStaff, ReportStatus::InProgress) => ReportStatus::InProgress,
        (ReportAction::RequestRevision, ReportStatus::InProgress) => {
            ReportStatus::RevisionRequired
        }
        // Approving revisions leaves the report in-progress until the
        // coordinator forwards it; it may currently be flagged either way.
        (ReportAction::ApproveRevisions, ReportStatus::InProgress)
        | (ReportAction::ApproveRevisions, ReportStatus::RevisionRequired) => {
            ReportStatus::InProgress
        }
        (ReportAction::ForwardToTu, ReportStatus::InProgress)
        | (ReportAction::ForwardToTu, ReportStatus::RevisionRequired) => {
            ReportStatus::PendingApprovalTu
        }
        (ReportAction::Finalize, ReportStatus::PendingApprovalTu) => ReportStatus::Completed,
        (ReportAction::Delete, ReportStatus::Draft)
        | (ReportAction::Delete, ReportStatus::RevisionRequired) => current,
        (action, current) => {
            return Err(AppError::InvalidTransition(format!(
                "cannot {} a report in status {}",
                action.as_str(),
                current
            )))
        }
    };
    Ok(next)
}

/// Check that a direct status edit corresponds to some legal action for the
/// caller's role. Used by the generic report-update endpoint, where clients
/// send a target status rather than a named action.
pub fn validate_status_change(
    current: ReportStatus,
    new: ReportStatus,
    role: Role,
) -> Result<(), AppError> {
    if current == new {
        return Ok(());
    }

    const ACTIONS: [ReportAction; 6] = [
        ReportAction::ForwardToCoordinator,
        ReportAction::AssignStaff,
        ReportAction::RequestRevision,
        ReportAction::ApproveRevisions,
        ReportAction::ForwardToTu,
        ReportAction::Finalize,
    ];

    let reachable = ACTIONS
        .iter()
        .any(|&a| validate_transition(a, current, role).is_ok_and(|next| next == new));

    if reachable {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!(
            "no permitted action moves a report from {} to {}",
            current, new
        )))
    }
}

/// Task-level transitions performed by staff and coordinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Staff submits first-pass work.
    SubmitWork,
    /// Staff submits a revised file after a rejection.
    SubmitRevision,
    /// Coordinator accepts a pending-review revision.
    ApproveRevision,
}

pub fn validate_task_transition(
    action: TaskAction,
    current: TaskStatus,
) -> Result<TaskStatus, AppError> {
    match (action, current) {
        (TaskAction::SubmitWork, TaskStatus::InProgress) => Ok(TaskStatus::Completed),
        (TaskAction::SubmitRevision, TaskStatus::RevisionRequired) => Ok(TaskStatus::PendingReview),
        (TaskAction::ApproveRevision, TaskStatus::PendingReview) => Ok(TaskStatus::Completed),
        (action, current) => Err(AppError::InvalidTransition(format!(
            "cannot {:?} an assignment in status {}",
            action, current
        ))),
    }
}

/// A report is eligible for the coordinator's final forward once every
/// assignment is settled and at least one assignment exists.
pub fn all_tasks_completed(statuses: &[TaskStatus]) -> bool {
    !statuses.is_empty() && statuses.iter().all(TaskStatus::is_settled)
}

/// Who holds the report once it enters `status`.
///
/// `pending-approval-tu` and `completed` are parked on the TU queue with no
/// active holder; every other status keeps the report on `holder`'s desk so
/// the per-holder dashboard queries stay accurate.
pub fn holder_after(status: ReportStatus, holder: Uuid) -> Option<Uuid> {
    match status {
        ReportStatus::PendingApprovalTu | ReportStatus::Completed => None,
        _ => Some(holder),
    }
}

/// Human-facing status shown on the dashboards, derived from assignment
/// state rather than stored.
///
/// Precedence: any rejected assignment wins, then incoming revisions, then
/// the all-settled final-review state, then the stored status verbatim.
pub fn display_status(report: &Report, assignments: &[TaskAssignment]) -> String {
    if assignments
        .iter()
        .any(|a| a.status == TaskStatus::RevisionRequired)
    {
        return "Perlu Revisi".to_string();
    }
    if assignments
        .iter()
        .any(|a| a.revised_file_path.is_some() && a.status == TaskStatus::Completed)
    {
        return "Revisi Masuk (Perlu Review)".to_string();
    }
    if !assignments.is_empty() && assignments.iter().all(|a| a.status.is_settled()) {
        return "Tugas Selesai (Review Akhir)".to_string();
    }
    report.status.to_string()
}

/// Per-report progress percentage: settled assignments over total.
pub fn report_progress(report: &Report, assignments: &[TaskAssignment]) -> u32 {
    if assignments.is_empty() {
        return if report.status == ReportStatus::Completed {
            100
        } else {
            0
        };
    }
    let settled = assignments.iter().filter(|a| a.status.is_settled()).count();
    ((settled as f64 / assignments.len() as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn report(status: ReportStatus) -> Report {
        Report {
            id: Uuid::new_v4(),
            no_surat: "005/TU/2025".to_string(),
            hal: "Permohonan data".to_string(),
            layanan: "Layanan Data".to_string(),
            sub_layanan: None,
            dari: "Dinas Kominfo".to_string(),
            tanggal_surat: None,
            tanggal_agenda: None,
            no_agenda: None,
            kelompok_asal_surat: None,
            agenda_sestama: None,
            link_documents: None,
            sifat: vec![],
            derajat: vec![],
            status,
            priority: crate::models::Priority::Sedang,
            created_by: Uuid::new_v4(),
            current_holder: None,
            coordinator_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(status: TaskStatus, revised: bool) -> TaskAssignment {
        TaskAssignment {
            id: Uuid::new_v4(),
            report_id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            coordinator_id: Uuid::new_v4(),
            todo_list: vec!["Siapkan data".to_string()],
            notes: None,
            status,
            completed_tasks: vec![],
            progress: 0,
            file_path: None,
            revised_file_path: revised.then(|| "revised_documents/x.pdf".to_string()),
            staff_notes: None,
            staff_revision_notes: None,
            revision_notes: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_forward_requires_draft() {
        let next = validate_transition(
            ReportAction::ForwardToCoordinator,
            ReportStatus::Draft,
            Role::Tu,
        )
        .unwrap();
        assert_eq!(next, ReportStatus::ForwardedToCoordinator);

        let err = validate_transition(
            ReportAction::ForwardToCoordinator,
            ReportStatus::InProgress,
            Role::Tu,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_role_gate_rejected_before_status() {
        let err = validate_transition(
            ReportAction::ForwardToCoordinator,
            ReportStatus::Draft,
            Role::Staff,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_assign_allowed_from_forwarded_and_in_progress() {
        for from in [ReportStatus::ForwardedToCoordinator, ReportStatus::InProgress] {
            let next =
                validate_transition(ReportAction::AssignStaff, from, Role::Koordinator).unwrap();
            assert_eq!(next, ReportStatus::InProgress);
        }
    }

    #[test]
    fn test_finalize_only_from_pending_approval() {
        let next = validate_transition(
            ReportAction::Finalize,
            ReportStatus::PendingApprovalTu,
            Role::Tu,
        )
        .unwrap();
        assert_eq!(next, ReportStatus::Completed);

        // Double-submit guard: a second finalize sees `completed` and fails.
        let err = validate_transition(ReportAction::Finalize, ReportStatus::Completed, Role::Tu)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_delete_only_draft_or_revision_required() {
        assert!(validate_transition(ReportAction::Delete, ReportStatus::Draft, Role::Tu).is_ok());
        assert!(validate_transition(
            ReportAction::Delete,
            ReportStatus::RevisionRequired,
            Role::Admin
        )
        .is_ok());
        assert!(
            validate_transition(ReportAction::Delete, ReportStatus::Completed, Role::Tu).is_err()
        );
    }

    #[test]
    fn test_status_change_reverse_lookup() {
        // TU can move draft to forwarded-to-coordinator directly.
        assert!(validate_status_change(
            ReportStatus::Draft,
            ReportStatus::ForwardedToCoordinator,
            Role::Tu
        )
        .is_ok());
        // Staff cannot move a report anywhere.
        assert!(validate_status_change(
            ReportStatus::Draft,
            ReportStatus::ForwardedToCoordinator,
            Role::Staff
        )
        .is_err());
        // No action jumps draft straight to completed.
        assert!(validate_status_change(ReportStatus::Draft, ReportStatus::Completed, Role::Tu)
            .is_err());
        // A no-op status write is always fine.
        assert!(validate_status_change(
            ReportStatus::InProgress,
            ReportStatus::InProgress,
            Role::Staff
        )
        .is_ok());
    }

    #[test]
    fn test_task_transitions() {
        assert_eq!(
            validate_task_transition(TaskAction::SubmitWork, TaskStatus::InProgress).unwrap(),
            TaskStatus::Completed
        );
        assert_eq!(
            validate_task_transition(TaskAction::SubmitRevision, TaskStatus::RevisionRequired)
                .unwrap(),
            TaskStatus::PendingReview
        );
        assert_eq!(
            validate_task_transition(TaskAction::ApproveRevision, TaskStatus::PendingReview)
                .unwrap(),
            TaskStatus::Completed
        );
        assert!(
            validate_task_transition(TaskAction::SubmitWork, TaskStatus::Completed).is_err()
        );
    }

    #[test]
    fn test_all_tasks_completed_requires_nonempty() {
        assert!(!all_tasks_completed(&[]));
        assert!(all_tasks_completed(&[
            TaskStatus::Completed,
            TaskStatus::PendingReview
        ]));
        assert!(!all_tasks_completed(&[
            TaskStatus::Completed,
            TaskStatus::InProgress
        ]));
    }

    #[test]
    fn test_display_status_precedence() {
        let r = report(ReportStatus::InProgress);

        // Rejection wins over everything.
        let a = vec![
            assignment(TaskStatus::RevisionRequired, false),
            assignment(TaskStatus::Completed, true),
        ];
        assert_eq!(display_status(&r, &a), "Perlu Revisi");

        // Completed-with-revision-file beats the all-settled label.
        let a = vec![
            assignment(TaskStatus::Completed, true),
            assignment(TaskStatus::PendingReview, false),
        ];
        assert_eq!(display_status(&r, &a), "Revisi Masuk (Perlu Review)");

        // All settled, no revision files.
        let a = vec![
            assignment(TaskStatus::Completed, false),
            assignment(TaskStatus::PendingReview, false),
        ];
        assert_eq!(display_status(&r, &a), "Tugas Selesai (Review Akhir)");

        // Otherwise the stored status verbatim.
        let a = vec![assignment(TaskStatus::InProgress, false)];
        assert_eq!(display_status(&r, &a), "in-progress");
        assert_eq!(display_status(&r, &[]), "in-progress");
    }

    #[test]
    fn test_holder_kept_through_active_states() {
        let coordinator = Uuid::new_v4();

        // Assigning staff and requesting revisions keep the report on the
        // coordinator's desk.
        assert_eq!(
            holder_after(ReportStatus::InProgress, coordinator),
            Some(coordinator)
        );
        assert_eq!(
            holder_after(ReportStatus::RevisionRequired, coordinator),
            Some(coordinator)
        );
        assert_eq!(
            holder_after(ReportStatus::Draft, coordinator),
            Some(coordinator)
        );

        // Parked on the TU queue: nobody holds it.
        assert_eq!(holder_after(ReportStatus::PendingApprovalTu, coordinator), None);
        assert_eq!(holder_after(ReportStatus::Completed, coordinator), None);
    }

    #[test]
    fn test_report_progress() {
        let r = report(ReportStatus::InProgress);
        let a = vec![
            assignment(TaskStatus::Completed, false),
            assignment(TaskStatus::InProgress, false),
            assignment(TaskStatus::PendingReview, false),
        ];
        assert_eq!(report_progress(&r, &a), 67);
        assert_eq!(report_progress(&r, &[]), 0);
        assert_eq!(report_progress(&report(ReportStatus::Completed), &[]), 100);
    }
}
