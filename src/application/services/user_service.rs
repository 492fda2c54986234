use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::application::services::auth_service::{hash_password, validate_password_complexity};
use crate::domain::entities::{AuditAction, AuditModule, NewUser, User, UserRole};
use crate::domain::ports::{session_repository::SessionRepository, user_repository::UserRepository};
use crate::domain::services::Capability;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};
use crate::shared::utils::{normalize_optional_email, require_non_empty};

use super::AuditService;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    audit: AuditService,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        audit: AuditService,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            audit,
        }
    }

    pub async fn create_user(
        &self,
        auth_user: &AuthenticatedUser,
        request: CreateUserRequest,
    ) -> ApiResult<User> {
        auth_user.require(Capability::UsersManage)?;

        let username = require_non_empty("Username", &request.username)?.to_lowercase();
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(ApiError::BadRequest(
                "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
            ));
        }
        let full_name = require_non_empty("Full name", &request.full_name)?;
        let email = normalize_optional_email(request.email)?;
        validate_password_complexity(&request.password)?;

        if self.user_repo.get_user_by_username(&username).await?.is_some() {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }

        let user = self
            .user_repo
            .create_user(&NewUser {
                username,
                email,
                full_name,
                role: request.role,
                password_hash: hash_password(&request.password)?,
            })
            .await?;

        info!(
            "User {} created {} ({})",
            auth_user.user.username, user.username, user.role
        );
        self.audit
            .record(
                auth_user,
                AuditAction::Create,
                AuditModule::Users,
                user.id,
                Some(json!({ "username": user.username, "role": user.role })),
            )
            .await;
        Ok(user)
    }

    pub async fn list_users(
        &self,
        auth_user: &AuthenticatedUser,
        role: Option<UserRole>,
    ) -> ApiResult<Vec<User>> {
        // Reception needs the engineer roster to dispatch tickets
        let roster_only = role == Some(UserRole::ServiceEngineer)
            && auth_user.can(Capability::ServiceRequestsAssign);
        if !roster_only {
            auth_user.require(Capability::UsersManage)?;
        }

        self.user_repo.list_users(role).await
    }

    pub async fn get_user(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<User> {
        if auth_user.id() != id {
            auth_user.require(Capability::UsersManage)?;
        }

        self.user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    /// Deactivates the account and ends all of its sessions.
    pub async fn deactivate_user(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<User> {
        auth_user.require(Capability::UsersManage)?;

        if auth_user.id() == id {
            return Err(ApiError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        let mut user = self
            .user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

        self.user_repo.set_user_active(id, false).await?;
        let ended = self.session_repo.delete_user_sessions(id).await?;

        info!(
            "User {} deactivated {} ({} sessions ended)",
            auth_user.user.username, user.username, ended
        );
        self.audit
            .record(auth_user, AuditAction::Deactivate, AuditModule::Users, id, None)
            .await;
        user.is_active = false;
        Ok(user)
    }
}
