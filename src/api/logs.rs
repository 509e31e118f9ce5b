use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreateHabitLogRequest, HabitLogDto};
use crate::api::validation::validate_habit_id;
use crate::services::AuthUser;

/// POST /habits/{id}/logs
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<CreateHabitLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<HabitLogDto>>), ApiError> {
    let id = validate_habit_id(id)?;
    let Json(payload) = payload?;

    let log = state
        .habit_service()
        .append_log(user.id, id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(log.into()))))
}

/// GET /habits/{id}/logs
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<HabitLogDto>>>, ApiError> {
    let id = validate_habit_id(id)?;
    let logs = state.habit_service().list_logs(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        logs.into_iter().map(HabitLogDto::from).collect(),
    )))
}
