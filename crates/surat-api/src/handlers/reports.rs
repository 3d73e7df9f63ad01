//! Report CRUD: create, partial update, listing, delete.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use surat_core::models::{
    actions, AttachmentPayload, NewReport, Priority, ReportPatch, ReportStatus,
};
use surat_core::workflow::{validate_status_change, validate_transition, ReportAction};
use surat_core::AppError;
use surat_db::with_transaction;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::ReportView;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub no_surat: String,
    pub hal: String,
    pub layanan: String,
    #[serde(default, alias = "sub_layanan")]
    pub sub_layanan: Option<String>,
    pub dari: String,
    #[serde(default)]
    pub tanggal_surat: Option<String>,
    #[serde(default)]
    pub tanggal_agenda: Option<String>,
    #[serde(default)]
    pub no_agenda: Option<String>,
    #[serde(default)]
    pub kelompok_asal_surat: Option<String>,
    #[serde(default)]
    pub agenda_sestama: Option<String>,
    #[serde(default)]
    pub link_documents: Option<String>,
    #[serde(default)]
    pub sifat: Vec<String>,
    #[serde(default)]
    pub derajat: Vec<String>,
    /// Unrecognized values coerce to `draft`.
    #[serde(default)]
    pub status: Option<String>,
    /// Unrecognized values coerce to `sedang`.
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub original_files: Vec<AttachmentPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub success: bool,
    pub report: ReportView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Create a report with its attachments and the first history entry, in one
/// transaction.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "reports",
    request_body = CreateReportRequest,
    responses(
        (status = 200, description = "Report created", body = ReportResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role cannot create reports", body = ErrorResponse),
        (status = 500, description = "Write failed", body = ErrorResponse)
    )
)]
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<CreateReportRequest>,
) -> Result<Json<ReportResponse>, HttpAppError> {
    if !auth.role().can_create_reports() {
        return Err(HttpAppError(AppError::Forbidden(
            "Only TU, Admin, and Coordinator can create reports".to_string(),
        )));
    }

    let status = ReportStatus::coerce(payload.status.as_deref());
    let priority = Priority::coerce(payload.priority.as_deref());

    let new_report = NewReport {
        no_surat: payload.no_surat,
        hal: payload.hal,
        layanan: payload.layanan,
        sub_layanan: payload.sub_layanan,
        dari: payload.dari,
        tanggal_surat: payload.tanggal_surat,
        tanggal_agenda: payload.tanggal_agenda,
        no_agenda: payload.no_agenda,
        kelompok_asal_surat: payload.kelompok_asal_surat,
        agenda_sestama: payload.agenda_sestama,
        link_documents: payload.link_documents,
        sifat: payload.sifat,
        derajat: payload.derajat,
        status,
        priority,
        created_by: auth.user_id,
        current_holder: Some(auth.user_id),
    };

    let role = auth.role();
    let user_id = auth.user_id;
    let original_files = payload.original_files;
    let reports = state.reports.clone();
    let attachments_repo = state.attachments.clone();
    let history = state.history.clone();

    let report = with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports.create_tx(tx, new_report).await?;

            attachments_repo
                .insert_many_tx(tx, report.id, user_id, &original_files)
                .await?;

            history
                .insert_tx(
                    tx,
                    report.id,
                    actions::REPORT_CREATED,
                    user_id,
                    status.as_str(),
                    Some(format!("Laporan baru dibuat oleh {}", role)),
                )
                .await?;

            Ok(report)
        })
    })
    .await?;

    tracing::info!(report_id = %report.id, actor = %auth.user_id, action = "create", "Report created");

    let view = load_view(&state, report.id).await?;
    Ok(Json(ReportResponse {
        success: true,
        report: view,
        message: None,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportRequest {
    pub id: Uuid,
    /// Optional history action label to record alongside the edit.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// When present, replaces the report's attachments wholesale.
    #[serde(default)]
    pub original_files: Option<Vec<AttachmentPayload>>,
    #[serde(flatten)]
    pub patch: ReportPatch,
}

/// Partial report update.
///
/// Merge contract: absent fields are left alone, explicit nulls clear, values
/// replace. When `originalFiles` is present the attachment set is replaced
/// (delete-all then insert) in the same transaction. A `status` change must
/// correspond to a legal transition for the caller's role.
#[utoipa::path(
    put,
    path = "/api/reports",
    tag = "reports",
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated", body = ReportResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse)
    )
)]
pub async fn update_report(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<UpdateReportRequest>,
) -> Result<Json<ReportResponse>, HttpAppError> {
    let report_id = payload.id;
    let role = auth.role();
    let user_id = auth.user_id;

    // A present-but-unparseable status is rejected here rather than coerced;
    // only create is permissive.
    let new_status = match payload.patch.status.as_deref() {
        Some(raw) => Some(ReportStatus::parse(raw).ok_or_else(|| {
            HttpAppError(AppError::InvalidInput(format!("Unknown status: {}", raw)))
        })?),
        None => None,
    };
    let new_priority = payload
        .patch
        .priority
        .as_deref()
        .map(|raw| Priority::coerce(Some(raw)));

    let reports = state.reports.clone();
    let attachments_repo = state.attachments.clone();
    let history = state.history.clone();
    let patch = payload.patch.clone();
    let original_files = payload.original_files.clone();
    let action = payload.action.clone();
    let notes = payload.notes.clone();

    let report = with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let current = reports
                .get_for_update_tx(tx, report_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

            if let Some(target) = new_status {
                validate_status_change(current.status, target, role)?;
            }

            let updated = reports
                .update_fields_tx(tx, report_id, &patch, new_status, new_priority)
                .await?;

            if let Some(files) = &original_files {
                attachments_repo.delete_by_report_tx(tx, report_id).await?;
                attachments_repo
                    .insert_many_tx(tx, report_id, user_id, files)
                    .await?;
            }

            if let Some(action) = &action {
                history
                    .insert_tx(
                        tx,
                        report_id,
                        action,
                        user_id,
                        updated.status.as_str(),
                        notes.clone(),
                    )
                    .await?;
            }

            Ok(updated)
        })
    })
    .await?;

    tracing::info!(report_id = %report.id, actor = %auth.user_id, action = "update", "Report updated");

    let view = load_view(&state, report.id).await?;
    Ok(Json(ReportResponse {
        success: true,
        report: view,
        message: Some("Berhasil update".to_string()),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListResponse {
    pub success: bool,
    pub reports: Vec<ReportView>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    /// Comma-separated status filter, e.g. `in-progress,pending-approval-tu`.
    pub status: Option<String>,
    /// Only reports currently held by this user id.
    pub holder: Option<Uuid>,
    /// Only reports with a task assignment for this staff profile id.
    pub staff: Option<Uuid>,
}

/// Reports newest first, with attachments, assignments, and the
/// creator's name joined in. Filters are mutually exclusive; the first
/// one present wins.
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Reports listed", body = ReportListResponse),
        (status = 400, description = "Unknown status in filter", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ReportListResponse>, HttpAppError> {
    let reports = if let Some(raw) = query.status.as_deref() {
        let mut statuses = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let status = ReportStatus::parse(part).ok_or_else(|| {
                AppError::InvalidInput(format!("Status tidak dikenal: '{part}'"))
            })?;
            statuses.push(status);
        }
        state.reports.list_by_statuses(&statuses).await?
    } else if let Some(holder) = query.holder {
        state.reports.list_by_holder(holder).await?
    } else if let Some(staff) = query.staff {
        state.reports.list_assigned_to_staff(staff).await?
    } else {
        state.reports.list_all().await?
    };

    // Creator names come from profiles keyed by auth subject id.
    let profiles = state.profiles.list().await?;
    let names_by_user: HashMap<Uuid, String> = profiles
        .iter()
        .map(|p| (p.user_id, p.display_name().to_string()))
        .collect();

    let mut views = Vec::with_capacity(reports.len());
    for report in reports {
        let attachments = state.attachments.list_by_report(report.id).await?;
        let assignments = state.assignments.list_with_staff(report.id).await?;
        let created_by_name = names_by_user.get(&report.created_by).cloned();
        views.push(ReportView::build(
            report,
            attachments,
            assignments,
            created_by_name,
        ));
    }

    Ok(Json(ReportListResponse {
        success: true,
        reports: views,
    }))
}

/// One report with its attachments, assignments, and history available
/// through the view.
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report found", body = ReportResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, HttpAppError> {
    let view = load_view(&state, id).await?;
    Ok(Json(ReportResponse {
        success: true,
        report: view,
        message: None,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Delete a report. Only TU/Admin, and only in `draft` or
/// `revision-required`. Attachments, assignments, and history cascade.
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report deleted", body = DeleteResponse),
        (status = 403, description = "Role cannot delete", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Report is not deletable in its current status", body = ErrorResponse)
    )
)]
pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let role = auth.role();
    let reports = state.reports.clone();

    with_transaction(&state.pool, |tx| {
        Box::pin(async move {
            let report = reports
                .get_for_update_tx(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

            validate_transition(ReportAction::Delete, report.status, role)?;

            reports.delete_tx(tx, id).await?;
            Ok(())
        })
    })
    .await?;

    tracing::info!(report_id = %id, actor = %auth.user_id, action = "delete", "Report deleted");

    Ok(Json(DeleteResponse { success: true }))
}

/// Assemble the full view of one report.
pub(crate) async fn load_view(
    state: &AppState,
    report_id: Uuid,
) -> Result<ReportView, HttpAppError> {
    let report = state
        .reports
        .get(report_id)
        .await?
        .ok_or_else(|| HttpAppError(AppError::NotFound(format!("Report {} not found", report_id))))?;

    let attachments = state.attachments.list_by_report(report_id).await?;
    let assignments = state.assignments.list_with_staff(report_id).await?;
    let created_by_name = state
        .profiles
        .get_by_user_id(report.created_by)
        .await?
        .map(|p| p.display_name().to_string());

    Ok(ReportView::build(
        report,
        attachments,
        assignments,
        created_by_name,
    ))
}
