use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domain::entities::User;
use crate::domain::services::{navigation_for, role_capabilities, NavItem};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub capabilities: Vec<&'static str>,
    pub navigation: &'static [NavItem],
    pub expires_at: String,
}

impl SessionResponse {
    fn new(user: User, expires_at: String) -> Self {
        Self {
            capabilities: role_capabilities(user.role)
                .iter()
                .map(|c| c.as_str())
                .collect(),
            navigation: navigation_for(user.role),
            user,
            expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub session: SessionResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let result = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: result.session.token,
        session: SessionResponse::new(result.user, result.session.expires_at),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.auth_service.logout(&auth_user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(SessionResponse::new(
        auth_user.user,
        auth_user.session.expires_at,
    )))
}
