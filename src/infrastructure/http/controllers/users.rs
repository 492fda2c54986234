use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::application::services::CreateUserRequest;
use crate::domain::entities::{User, UserRole};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

pub async fn create_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.user_service.create_user(&auth_user, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.user_service.list_users(&auth_user, query.role).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.get_user(&auth_user, id).await?;
    Ok(Json(user))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.deactivate_user(&auth_user, id).await?;
    Ok(Json(user))
}
