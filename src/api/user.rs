use axum::{Extension, Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::services::AuthUser;

/// GET /user
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let profile = state.auth_service().profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

/// DELETE /user
/// Removes the account with all of its habits and logs.
pub async fn delete_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    state.auth_service().delete_account(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
