use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CreateHabitRequest, HabitDto, ListHabitsQuery,
    ResetResponse, UpdateHabitRequest,
};
use crate::api::validation::{validate_habit_id, validate_list_query};
use crate::services::{AuthUser, HabitError};

impl From<HabitError> for ApiError {
    fn from(err: HabitError) -> Self {
        match err {
            HabitError::NotFound(id) => Self::not_found("Habit", id),
            HabitError::InvalidArgument(msg) => Self::validation(msg),
            HabitError::Conflict(msg) => Self::Conflict(msg),
            HabitError::StorageUnavailable(msg) => Self::ServiceUnavailable(msg),
        }
    }
}

/// Lists the caller's habits after rolling them into the current period.
///
/// # Endpoint
/// `GET /api/habits?skip&limit&include_archived&category&frequency&completed`
pub async fn list_habits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListHabitsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<HabitDto>>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let (filter, page) = validate_list_query(&query)?;

    let habits = state
        .habit_service()
        .list_habits(user.id, filter, page)
        .await?;

    Ok(Json(ApiResponse::success(
        habits.into_iter().map(HabitDto::from).collect(),
    )))
}

pub async fn create_habit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateHabitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<HabitDto>>), ApiError> {
    let Json(payload) = payload?;

    let habit = state
        .habit_service()
        .create_habit(user.id, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(HabitDto::from(habit))),
    ))
}

pub async fn get_habit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<HabitDto>>, ApiError> {
    let id = validate_habit_id(id)?;
    let habit = state.habit_service().get_habit(user.id, id).await?;
    Ok(Json(ApiResponse::success(habit.into())))
}

/// Partial update. A `completed` change adjusts the streak.
///
/// # Errors
/// Returns 409 when the habit was modified concurrently.
pub async fn update_habit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateHabitRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<HabitDto>>, ApiError> {
    let id = validate_habit_id(id)?;
    let Json(payload) = payload?;

    let habit = state
        .habit_service()
        .update_habit(user.id, id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(habit.into())))
}

pub async fn delete_habit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_habit_id(id)?;
    state.habit_service().delete_habit(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_archive(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<HabitDto>>, ApiError> {
    let id = validate_habit_id(id)?;
    let habit = state.habit_service().toggle_archive(user.id, id).await?;
    Ok(Json(ApiResponse::success(habit.into())))
}

/// Runs the reset sweep immediately.
///
/// # Endpoint
/// `POST /api/habits/reset`
pub async fn reset_habits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<ResetResponse>>, ApiError> {
    let reset_count = state.habit_service().reset_habits(user.id).await?;

    Ok(Json(ApiResponse::success(ResetResponse {
        reset_count,
        message: format!("Reset {reset_count} habit(s)"),
    })))
}
