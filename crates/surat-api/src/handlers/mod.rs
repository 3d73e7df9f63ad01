//! HTTP handlers.

pub mod health;
pub mod profiles;
pub mod reports;
pub mod tracking;
pub mod upload;
pub mod workflow;

use surat_core::models::{FileAttachment, Report};
use surat_core::workflow::{display_status, report_progress};
use surat_db::AssignmentWithStaff;

use serde::Serialize;
use utoipa::ToSchema;

/// A report as returned by the listing and mutation endpoints: the stored
/// row plus its attachments, assignments, and the derived display fields.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub tracking_number: String,
    /// Status the dashboards show, derived from assignment state.
    pub display_status: String,
    pub progress: u32,
    pub file_attachments: Vec<FileAttachment>,
    pub task_assignments: Vec<AssignmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: surat_core::models::TaskAssignment,
    pub staff_name: String,
}

impl ReportView {
    pub fn build(
        report: Report,
        attachments: Vec<FileAttachment>,
        assignments: Vec<AssignmentWithStaff>,
        created_by_name: Option<String>,
    ) -> Self {
        let plain: Vec<_> = assignments.iter().map(|a| a.assignment.clone()).collect();
        Self {
            tracking_number: report.tracking_number(),
            display_status: display_status(&report, &plain),
            progress: report_progress(&report, &plain),
            file_attachments: attachments,
            task_assignments: assignments
                .into_iter()
                .map(|a| AssignmentView {
                    assignment: a.assignment,
                    staff_name: a.staff_name,
                })
                .collect(),
            created_by_name,
            report,
        }
    }
}
