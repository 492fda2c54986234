use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::application::services::{CheckInRequest, TodayAttendance};
use crate::domain::entities::Attendance;
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

pub async fn check_in(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CheckInRequest>,
) -> ApiResult<(StatusCode, Json<Attendance>)> {
    let attendance = state.attendance_service.check_in(&auth_user, request).await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

pub async fn today(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<TodayAttendance>> {
    let today = state.attendance_service.today(&auth_user).await?;
    Ok(Json(today))
}

pub async fn my_history(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Attendance>>> {
    let records = state
        .attendance_service
        .my_history(&auth_user, query.limit)
        .await?;
    Ok(Json(records))
}

pub async fn employee_history(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Attendance>>> {
    let records = state
        .attendance_service
        .employee_history(&auth_user, user_id, query.limit)
        .await?;
    Ok(Json(records))
}

pub async fn all_today(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Attendance>>> {
    let records = state.attendance_service.all_today(&auth_user).await?;
    Ok(Json(records))
}
