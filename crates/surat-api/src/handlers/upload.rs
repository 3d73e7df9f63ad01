//! Standalone file upload for report attachments.
//!
//! Uploads land in object storage immediately; the returned metadata is
//! attached to a report by a later create or update call.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use surat_core::validation::{sanitize_filename, validate_file_size};
use surat_core::AppError;
use surat_storage::DocumentBucket;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Uuid,
}

/// Upload an original report document. Accepts `file`, an optional
/// `reportId` to group the object key under, and returns attachment
/// metadata without touching the database.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file in the request", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload cap", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut report_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "dokumen".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                file = Some((filename, content_type, data.to_vec()));
            }
            "reportId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid text field: {}", e)))?;
                report_id = text.parse().ok();
            }
            _ => {}
        }
    }

    let (filename, content_type, data) = file
        .ok_or_else(|| HttpAppError(AppError::InvalidInput("No file provided".to_string())))?;
    validate_file_size(data.len(), state.config.max_upload_size_bytes)?;

    let safe_name = sanitize_filename(&filename);
    let size = data.len() as i64;
    // Ad-hoc uploads without a report yet get a fresh grouping id.
    let group = report_id.unwrap_or_else(Uuid::new_v4);

    let (_key, url) = state
        .storage
        .upload(
            DocumentBucket::OriginalReports,
            group,
            &safe_name,
            &content_type,
            data,
        )
        .await?;

    tracing::info!(file_name = %safe_name, file_size = size, actor = %auth.user_id, "File uploaded");

    Ok(Json(UploadResponse {
        success: true,
        file_name: safe_name,
        file_url: url,
        file_size: size,
        file_type: content_type,
        uploaded_by: auth.user_id,
    }))
}
