use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::services::NotificationPage;
use crate::domain::entities::Notification;
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub count: u64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Json<NotificationPage>> {
    let page = state
        .notification_service
        .list_notifications(auth_user.id(), query.unread_only, query.limit, query.offset)
        .await?;
    Ok(Json(page))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let count = state.notification_service.unread_count(auth_user.id()).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    let notification = state
        .notification_service
        .mark_read(auth_user.id(), &id)
        .await?;
    Ok(Json(notification))
}

pub async fn mark_all_as_read(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let count = state
        .notification_service
        .mark_all_read(auth_user.id())
        .await?;
    Ok(Json(MarkAllReadResponse { count }))
}
