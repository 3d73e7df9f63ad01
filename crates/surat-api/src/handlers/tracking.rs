//! Public tracking lookup. No authentication: anyone holding a letter
//! number or tracking code can see where the report sits.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use surat_core::tracking::{project, TrackingView};
use surat_core::AppError;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TrackQuery {
    /// Letter number (`no_surat`) or tracking code (`TRK-XXXXXXXX`).
    pub search: String,
}

/// Look up a report's public timeline by letter number or tracking code.
#[utoipa::path(
    get,
    path = "/api/track",
    tag = "tracking",
    params(TrackQuery),
    responses(
        (status = 200, description = "Tracking timeline", body = TrackingView),
        (status = 400, description = "Empty search term", body = ErrorResponse),
        (status = 404, description = "No report matches the search term", body = ErrorResponse)
    )
)]
pub async fn track_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<TrackingView>, HttpAppError> {
    let term = query.search.trim();
    if term.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "A letter number or tracking code is required".to_string(),
        )));
    }

    let report = state
        .reports
        .find_by_tracking(term)
        .await?
        .ok_or_else(|| {
            HttpAppError(AppError::NotFound(format!(
                "Laporan dengan nomor '{}' tidak ditemukan",
                term
            )))
        })?;

    let history = state.history.list_by_report(report.id).await?;
    let assignments = state.assignments.list_with_staff(report.id).await?;
    let pairs: Vec<_> = assignments
        .into_iter()
        .map(|row| (row.assignment, row.staff_name))
        .collect();

    let holder_name = match report.current_holder {
        Some(user_id) => state
            .profiles
            .get_by_user_id(user_id)
            .await?
            .map(|p| p.display_name().to_string()),
        None => None,
    };

    let view = project(&report, &history, &pairs, holder_name, Utc::now());
    Ok(Json(view))
}
