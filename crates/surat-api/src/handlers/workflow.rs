//! Workflow transition endpoints: forward, assign, submit, revise, approve,
//! finalize.
//!
//! Every endpoint consults the transition table under a row lock, then
//! performs its writes plus a history entry in one transaction.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use surat_core::models::{actions, ReportStatus, TaskStatus};
use surat_core::services::all_documents_verified;
use surat_core::validation::{sanitize_filename, validate_file_size};
use surat_core::workflow::{
    all_tasks_completed, holder_after, validate_task_transition, validate_transition, ReportAction,
    TaskAction,
};
use surat_core::AppError;
use surat_db::with_transaction;
use surat_storage::DocumentBucket;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::reports::load_view;
use crate::handlers::ReportView;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowResponse {
    pub success: bool,
    pub report: ReportView,
    pub message: String,
}

async fn respond(
    state: &AppState,
    report_id: Uuid,
    message: &str,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    Ok(Json(WorkflowResponse {
        success: true,
        report: load_view(state, report_id).await?,
        message: message.to_string(),
    }))
}

// ---------------------------------------------------------------- forward

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRequest {
    pub coordinator_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

/// TU forwards a draft report to a coordinator.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/forward",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = ForwardRequest,
    responses(
        (status = 200, description = "Report forwarded", body = WorkflowResponse),
        (status = 403, description = "Role cannot forward", body = ErrorResponse),
        (status = 404, description = "Report or coordinator not found", body = ErrorResponse),
        (status = 409, description = "Report is not in draft", body = ErrorResponse)
    )
)]
pub async fn forward_to_coordinator(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ForwardRequest>,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    let role = auth.role();
    let user_id = auth.user_id;

    let coordinator = state
        .profiles
        .get(payload.coordinator_id)
        .await?
        .ok_or_else(|| {
            HttpAppError(AppError::NotFound(format!(
                "Coordinator profile {} not found",
                payload.coordinator_id
            )))
        })?;

    let reports = state.reports.clone();
    let history = state.history.clone();
    let notes = payload.notes.clone();
    let coordinator_profile_id = coordinator.id;
    let coordinator_user_id = coordinator.user_id;
    let coordinator_name = coordinator.display_name().to_string();

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            let next = validate_transition(ReportAction::ForwardToCoordinator, report.status, role)?;

            reports
                .set_coordinator_tx(tx, id, coordinator_profile_id)
                .await?;
            reports
                .set_status_tx(tx, id, next, holder_after(next, coordinator_user_id))
                .await?;

            history
                .insert_tx(
                    tx,
                    id,
                    actions::FORWARDED_TO_COORDINATOR,
                    user_id,
                    next.as_str(),
                    Some(notes.unwrap_or_else(|| {
                        format!("Diteruskan ke {}", coordinator_name)
                    })),
                )
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %user_id, action = "forward", "Report forwarded to coordinator");
    respond(&state, id, "Laporan diteruskan ke Koordinator").await
}

// ------------------------------------------------------------------ assign

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub staff_id: Uuid,
    pub todo_list: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffRequest {
    pub assignments: Vec<AssignmentInput>,
}

/// Coordinator assigns staff with to-do lists. Each staff member may hold
/// only one live assignment per report, enforced by the database.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assignments",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = AssignStaffRequest,
    responses(
        (status = 200, description = "Staff assigned", body = WorkflowResponse),
        (status = 400, description = "Empty assignment or duplicate staff", body = ErrorResponse),
        (status = 403, description = "Role cannot assign", body = ErrorResponse),
        (status = 409, description = "Report cannot be assigned in its current status", body = ErrorResponse)
    )
)]
pub async fn assign_staff(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignStaffRequest>,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    if payload.assignments.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "At least one staff assignment is required".to_string(),
        )));
    }
    for input in &payload.assignments {
        if input.todo_list.iter().all(|t| t.trim().is_empty()) {
            return Err(HttpAppError(AppError::InvalidInput(
                "Each assignment needs at least one to-do item".to_string(),
            )));
        }
    }

    let role = auth.role();
    let user_id = auth.user_id;
    let coordinator_profile_id = auth.profile.id;

    let reports = state.reports.clone();
    let assignments_repo = state.assignments.clone();
    let history = state.history.clone();
    let inputs = payload.assignments;

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            let next = validate_transition(ReportAction::AssignStaff, report.status, role)?;

            let count = inputs.len();
            for input in inputs {
                assignments_repo
                    .create_tx(
                        tx,
                        id,
                        input.staff_id,
                        coordinator_profile_id,
                        input.todo_list,
                        input.notes,
                    )
                    .await?;
            }

            // The coordinator keeps holding the report while staff work on it.
            reports
                .set_status_tx(tx, id, next, holder_after(next, user_id))
                .await?;

            history
                .insert_tx(
                    tx,
                    id,
                    actions::STAFF_ASSIGNED,
                    user_id,
                    next.as_str(),
                    Some(format!("Ditugaskan kepada {} staff", count)),
                )
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %user_id, action = "assign", "Staff assigned");
    respond(&state, id, "Laporan ditugaskan ke staff").await
}

// ------------------------------------------------------------------ submit

/// Fields parsed out of a staff submission multipart form.
struct SubmissionForm {
    file: Option<(String, String, Vec<u8>)>,
    notes: Option<String>,
    completed_tasks: Vec<String>,
    document_verification: HashMap<String, String>,
    progress: Option<i32>,
}

async fn parse_submission(mut multipart: Multipart) -> Result<SubmissionForm, AppError> {
    let mut form = SubmissionForm {
        file: None,
        notes: None,
        completed_tasks: Vec::new(),
        document_verification: HashMap::new(),
        progress: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "dokumen.pdf".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                form.file = Some((filename, content_type, data.to_vec()));
            }
            "notes" | "staffNotes" | "staffRevisionNotes" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid text field: {}", e)))?;
                form.notes = Some(text);
            }
            "completedTasks" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid text field: {}", e)))?;
                form.completed_tasks = serde_json::from_str(&text).map_err(|e| {
                    AppError::InvalidInput(format!("completedTasks must be a JSON array: {}", e))
                })?;
            }
            "documentVerification" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid text field: {}", e)))?;
                form.document_verification = serde_json::from_str(&text).map_err(|e| {
                    AppError::InvalidInput(format!(
                        "documentVerification must be a JSON object: {}",
                        e
                    ))
                })?;
            }
            "progress" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid text field: {}", e)))?;
                form.progress = text.parse().ok();
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Staff submits first-pass work: the work file, checked to-dos, and the
/// required-document verification. Everything is validated server-side.
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/submit",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Work submitted", body = WorkflowResponse),
        (status = 400, description = "Missing file, unchecked to-dos, or unverified documents", body = ErrorResponse),
        (status = 403, description = "Not the assigned staff member", body = ErrorResponse),
        (status = 409, description = "Assignment is not in progress", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload cap", body = ErrorResponse)
    )
)]
pub async fn submit_work(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    let form = parse_submission(multipart).await?;
    let (filename, content_type, data) = form
        .file
        .ok_or_else(|| HttpAppError(AppError::InvalidInput("No file provided".to_string())))?;
    validate_file_size(data.len(), state.config.max_upload_size_bytes)?;

    let assignment = state
        .assignments
        .get(id)
        .await?
        .ok_or_else(|| HttpAppError(AppError::NotFound(format!("Assignment {} not found", id))))?;

    if assignment.staff_id != auth.profile.id {
        return Err(HttpAppError(AppError::Forbidden(
            "Only the assigned staff member can submit this work".to_string(),
        )));
    }

    let report = state
        .reports
        .get(assignment.report_id)
        .await?
        .ok_or_else(|| {
            HttpAppError(AppError::NotFound(format!(
                "Report {} not found",
                assignment.report_id
            )))
        })?;

    // Every to-do must be checked off.
    let unchecked: Vec<_> = assignment
        .todo_list
        .iter()
        .filter(|t| !form.completed_tasks.contains(t))
        .collect();
    if !unchecked.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "{} to-do item(s) are not completed",
            unchecked.len()
        ))));
    }

    // Every required document for the service must be verified present.
    if !all_documents_verified(
        &report.layanan,
        report.sub_layanan.as_deref(),
        &form.document_verification,
    ) {
        return Err(HttpAppError(AppError::InvalidInput(
            "Harap pastikan semua dokumen yang disyaratkan telah diverifikasi 'Ada'".to_string(),
        )));
    }

    let (storage_key, _url) = state
        .storage
        .upload(
            DocumentBucket::Documents,
            report.id,
            &sanitize_filename(&filename),
            &content_type,
            data,
        )
        .await?;

    let user_id = auth.user_id;
    let report_id = report.id;
    let assignments_repo = state.assignments.clone();
    let history = state.history.clone();
    let completed_tasks = form.completed_tasks;
    let notes = form.notes;
    let progress = form.progress.unwrap_or(100);

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let current = assignments_repo
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

            validate_task_transition(TaskAction::SubmitWork, current.status)?;

            assignments_repo
                .submit_work_tx(tx, id, &storage_key, notes.clone(), completed_tasks, progress)
                .await?;

            history
                .insert_tx(
                    tx,
                    report_id,
                    actions::WORK_SUBMITTED,
                    user_id,
                    TaskStatus::Completed.as_str(),
                    notes,
                )
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %report_id, assignment_id = %id, actor = %user_id, action = "submit", "Work submitted");
    respond(&state, report_id, "Pekerjaan dikirim untuk review").await
}

/// Staff submits a revised file after a rejection, moving the assignment to
/// `pending-review`.
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/revision",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Revision submitted", body = WorkflowResponse),
        (status = 400, description = "Missing file", body = ErrorResponse),
        (status = 403, description = "Not the assigned staff member", body = ErrorResponse),
        (status = 409, description = "Assignment is not awaiting revision", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload cap", body = ErrorResponse)
    )
)]
pub async fn submit_revision(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    let form = parse_submission(multipart).await?;
    let (filename, content_type, data) = form
        .file
        .ok_or_else(|| HttpAppError(AppError::InvalidInput("No file provided".to_string())))?;
    validate_file_size(data.len(), state.config.max_upload_size_bytes)?;

    let assignment = state
        .assignments
        .get(id)
        .await?
        .ok_or_else(|| HttpAppError(AppError::NotFound(format!("Assignment {} not found", id))))?;

    if assignment.staff_id != auth.profile.id {
        return Err(HttpAppError(AppError::Forbidden(
            "Only the assigned staff member can submit this revision".to_string(),
        )));
    }

    let (storage_key, _url) = state
        .storage
        .upload(
            DocumentBucket::RevisedDocuments,
            assignment.report_id,
            &sanitize_filename(&filename),
            &content_type,
            data,
        )
        .await?;

    let user_id = auth.user_id;
    let report_id = assignment.report_id;
    let assignments_repo = state.assignments.clone();
    let history = state.history.clone();
    let notes = form.notes;

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let current = assignments_repo
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

            validate_task_transition(TaskAction::SubmitRevision, current.status)?;

            assignments_repo
                .submit_revision_tx(tx, id, &storage_key, notes.clone())
                .await?;

            history
                .insert_tx(
                    tx,
                    report_id,
                    actions::REVISION_SUBMITTED,
                    user_id,
                    TaskStatus::PendingReview.as_str(),
                    notes,
                )
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %report_id, assignment_id = %id, actor = %user_id, action = "revise", "Revision submitted");
    respond(&state, report_id, "Revisi Selesai").await
}

// ---------------------------------------------------------------- download

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct FileQuery {
    /// Fetch the revised file instead of the first-pass work file.
    #[serde(default)]
    pub revised: bool,
    /// Requested URL lifetime in seconds, clamped to the allowed window.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileUrlResponse {
    pub success: bool,
    pub url: String,
    pub expires_in: u64,
}

/// Presigned download URL for an assignment's work or revised file.
#[utoipa::path(
    get,
    path = "/api/assignments/{id}/file",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Assignment id"), FileQuery),
    responses(
        (status = 200, description = "Download URL", body = FileUrlResponse),
        (status = 404, description = "Assignment or file not found", body = ErrorResponse)
    )
)]
pub async fn download_assignment_file(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Query(query): Query<FileQuery>,
) -> Result<Json<FileUrlResponse>, HttpAppError> {
    let assignment = state
        .assignments
        .get(id)
        .await?
        .ok_or_else(|| HttpAppError(AppError::NotFound(format!("Assignment {} not found", id))))?;

    let key = if query.revised {
        assignment.revised_file_path
    } else {
        assignment.file_path
    }
    .ok_or_else(|| {
        HttpAppError(AppError::NotFound(
            "No file has been submitted for this assignment".to_string(),
        ))
    })?;

    let expiry = Duration::from_secs(state.config.clamp_presign_secs(query.expires_in));
    let url = state.storage.presigned_url(&key, expiry).await?;

    Ok(Json(FileUrlResponse {
        success: true,
        url,
        expires_in: expiry.as_secs(),
    }))
}

// -------------------------------------------------------- coordinator review

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestRevisionRequest {
    pub assignment_id: Uuid,
    pub notes: String,
}

/// Coordinator rejects an assignment's work with a revision note. The
/// report drops back to `revision-required`.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/request-revision",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = RequestRevisionRequest,
    responses(
        (status = 200, description = "Revision requested", body = WorkflowResponse),
        (status = 400, description = "Missing revision note", body = ErrorResponse),
        (status = 403, description = "Role cannot request revisions", body = ErrorResponse),
        (status = 409, description = "Report is not in progress", body = ErrorResponse)
    )
)]
pub async fn request_revision(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestRevisionRequest>,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    if payload.notes.trim().is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "A revision note is required".to_string(),
        )));
    }

    let role = auth.role();
    let user_id = auth.user_id;
    let reports = state.reports.clone();
    let assignments_repo = state.assignments.clone();
    let history = state.history.clone();
    let assignment_id = payload.assignment_id;
    let notes = payload.notes.clone();

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            let next = validate_transition(ReportAction::RequestRevision, report.status, role)?;

            let assignment = assignments_repo
                .request_revision_tx(tx, assignment_id, &notes)
                .await?;
            if assignment.report_id != id {
                return Err(AppError::InvalidInput(
                    "Assignment does not belong to this report".to_string(),
                ));
            }

            reports
                .set_status_tx(tx, id, next, holder_after(next, user_id))
                .await?;

            history
                .insert_tx(
                    tx,
                    id,
                    actions::REVISION_REQUESTED,
                    user_id,
                    next.as_str(),
                    Some(notes),
                )
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %user_id, action = "request-revision", "Revision requested");
    respond(&state, id, "Revisi diminta").await
}

/// Coordinator approves every pending-review revision on a report.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/approve-revisions",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "Revisions approved", body = WorkflowResponse),
        (status = 400, description = "No pending-review assignments", body = ErrorResponse),
        (status = 403, description = "Role cannot approve", body = ErrorResponse)
    )
)]
pub async fn approve_revisions(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    let role = auth.role();
    let user_id = auth.user_id;
    let reports = state.reports.clone();
    let assignments_repo = state.assignments.clone();
    let history = state.history.clone();

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            let next = validate_transition(ReportAction::ApproveRevisions, report.status, role)?;

            let approved = assignments_repo.approve_pending_tx(tx, id).await?;
            if approved == 0 {
                return Err(AppError::InvalidInput(
                    "No pending-review assignments to approve".to_string(),
                ));
            }

            reports.set_status_tx(tx, id, next, report.current_holder).await?;

            history
                .insert_tx(
                    tx,
                    id,
                    actions::REVISIONS_APPROVED,
                    user_id,
                    next.as_str(),
                    Some(format!("{} revisi disetujui", approved)),
                )
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %user_id, action = "approve-revisions", "Revisions approved");
    respond(&state, id, "Revisi Staff Disetujui").await
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct NotesOnly {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Coordinator forwards the finished report to TU. Requires every
/// assignment to be completed or pending-review.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/forward-tu",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = NotesOnly,
    responses(
        (status = 200, description = "Report forwarded to TU", body = WorkflowResponse),
        (status = 400, description = "Unfinished assignments remain", body = ErrorResponse),
        (status = 403, description = "Role cannot forward", body = ErrorResponse),
        (status = 409, description = "Report cannot be forwarded in its current status", body = ErrorResponse)
    )
)]
pub async fn forward_to_tu(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    payload: Option<Json<NotesOnly>>,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    let role = auth.role();
    let user_id = auth.user_id;
    let reports = state.reports.clone();
    let assignments_repo = state.assignments.clone();
    let history = state.history.clone();
    let notes = payload.and_then(|Json(p)| p.notes);

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            let next = validate_transition(ReportAction::ForwardToTu, report.status, role)?;

            let statuses = assignments_repo.statuses_for_report_tx(tx, id).await?;
            if !all_tasks_completed(&statuses) {
                return Err(AppError::InvalidInput(
                    "Every assignment must be completed before forwarding to TU".to_string(),
                ));
            }

            // Parked waiting for TU; no individual holder.
            reports
                .set_status_tx(tx, id, next, holder_after(next, user_id))
                .await?;

            history
                .insert_tx(tx, id, actions::FORWARDED_TO_TU, user_id, next.as_str(), notes)
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %user_id, action = "forward-tu", "Report forwarded to TU");
    respond(&state, id, "Pekerjaan Staff Disetujui & Diteruskan ke TU").await
}

/// TU finalizes a report. Only legal from `pending-approval-tu`; a repeat
/// call sees `completed` and gets a 409, so double submits are inert.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/finalize",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = NotesOnly,
    responses(
        (status = 200, description = "Report finalized", body = WorkflowResponse),
        (status = 403, description = "Role cannot finalize", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Report is not awaiting TU approval", body = ErrorResponse)
    )
)]
pub async fn finalize(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    payload: Option<Json<NotesOnly>>,
) -> Result<Json<WorkflowResponse>, HttpAppError> {
    let role = auth.role();
    let user_id = auth.user_id;
    let reports = state.reports.clone();
    let history = state.history.clone();
    let notes = payload.and_then(|Json(p)| p.notes);

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            let next = validate_transition(ReportAction::Finalize, report.status, role)?;
            debug_assert_eq!(next, ReportStatus::Completed);

            reports
                .set_status_tx(tx, id, next, holder_after(next, user_id))
                .await?;

            history
                .insert_tx(tx, id, actions::FINALIZED, user_id, next.as_str(), notes)
                .await?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %user_id, action = "finalize", "Report finalized");
    respond(&state, id, "Laporan diselesaikan oleh TU").await
}
