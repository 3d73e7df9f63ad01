//! OpenAPI documentation, served at `/api/openapi.json` and rendered by
//! RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use surat_core::models;
use surat_core::tracking;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Surat Tracking API",
        version = "0.1.0",
        description = "Report workflow API for administrative letters (surat). \
            Reports flow from TU through a coordinator to staff and back, with \
            file attachments in S3-compatible storage, an append-only workflow \
            history, and a public tracking lookup."
    ),
    paths(
        handlers::health::health_check,
        // Reports
        handlers::reports::create_report,
        handlers::reports::list_reports,
        handlers::reports::get_report,
        handlers::reports::update_report,
        handlers::reports::delete_report,
        // Workflow
        handlers::workflow::forward_to_coordinator,
        handlers::workflow::assign_staff,
        handlers::workflow::submit_work,
        handlers::workflow::submit_revision,
        handlers::workflow::request_revision,
        handlers::workflow::approve_revisions,
        handlers::workflow::forward_to_tu,
        handlers::workflow::finalize,
        handlers::workflow::download_assignment_file,
        // Files
        handlers::upload::upload_file,
        // Public tracking
        handlers::tracking::track_report,
        // Profiles
        handlers::profiles::list_profiles,
        handlers::profiles::update_profile,
    ),
    components(
        schemas(
            models::Report,
            models::ReportStatus,
            models::Priority,
            models::TaskAssignment,
            models::TaskStatus,
            models::FileAttachment,
            models::AttachmentPayload,
            models::WorkflowHistoryEntry,
            models::Profile,
            models::Role,
            tracking::TrackingView,
            tracking::TimelineStep,
            tracking::StepStatus,
            tracking::CoordinatorNote,
            handlers::ReportView,
            handlers::AssignmentView,
            handlers::health::HealthResponse,
            handlers::reports::CreateReportRequest,
            handlers::reports::UpdateReportRequest,
            handlers::reports::ReportResponse,
            handlers::reports::ReportListResponse,
            handlers::workflow::ForwardRequest,
            handlers::workflow::AssignStaffRequest,
            handlers::workflow::AssignmentInput,
            handlers::workflow::RequestRevisionRequest,
            handlers::workflow::NotesOnly,
            handlers::workflow::WorkflowResponse,
            handlers::workflow::FileUrlResponse,
            handlers::upload::UploadResponse,
            handlers::profiles::ProfileListResponse,
            handlers::profiles::UpdateProfileRequest,
            handlers::profiles::ProfileResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "reports", description = "Report CRUD"),
        (name = "workflow", description = "Workflow transitions"),
        (name = "upload", description = "File uploads"),
        (name = "tracking", description = "Public tracking lookup"),
        (name = "profiles", description = "User profiles"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
