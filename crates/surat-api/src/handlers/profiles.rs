//! Profile listing and admin-only profile management.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use surat_core::models::{Profile, Role};
use surat_core::AppError;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ProfileQuery {
    /// Restrict to one role, e.g. `staff` or `koordinator`.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileListResponse {
    pub success: bool,
    pub profiles: Vec<Profile>,
}

/// List profiles, optionally filtered by role. Used to populate
/// coordinator and staff pickers.
#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "profiles",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Profiles", body = ProfileListResponse),
        (status = 400, description = "Unknown role filter", body = ErrorResponse)
    )
)]
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileListResponse>, HttpAppError> {
    let profiles = match query.role.as_deref() {
        Some(raw) => {
            let role = Role::parse(raw).ok_or_else(|| {
                HttpAppError(AppError::InvalidInput(format!("Unknown role '{}'", raw)))
            })?;
            state.profiles.list_by_role(role).await?
        }
        None => state.profiles.list().await?,
    };

    Ok(Json(ProfileListResponse {
        success: true,
        profiles,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: Profile,
}

/// Admin updates a profile's name or role.
#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = Uuid, Path, description = "Profile id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 403, description = "Only admins can manage profiles", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, HttpAppError> {
    if auth.role() != Role::Admin {
        return Err(HttpAppError(AppError::Forbidden(
            "Only admins can manage profiles".to_string(),
        )));
    }

    let role = match payload.role.as_deref() {
        Some(raw) => Some(Role::parse(raw).ok_or_else(|| {
            HttpAppError(AppError::InvalidInput(format!("Unknown role '{}'", raw)))
        })?),
        None => None,
    };

    let profile = state
        .profiles
        .update(id, role, payload.name, payload.full_name)
        .await?;

    tracing::info!(profile_id = %id, actor = %auth.user_id, "Profile updated");

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}
