use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::application::services::{
    AttendanceService, AuditService, AuthService, EnquiryService, FeedbackService,
    NotificationService, OrderService, ServiceRequestService, UserService,
};
use crate::domain::entities::{Session, User, UserRole};
use crate::domain::services::{has_capability, role_capabilities, Capability};
use crate::infrastructure::http::middleware::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub service_request_service: ServiceRequestService,
    pub enquiry_service: EnquiryService,
    pub order_service: OrderService,
    pub attendance_service: AttendanceService,
    pub notification_service: NotificationService,
    pub feedback_service: FeedbackService,
    pub audit_service: AuditService,
}

/// Extract and validate the session token from the Authorization header
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let (session, user) = state.auth_service.resolve_session(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser {
        user,
        session,
        token,
    });

    Ok(next.run(request).await)
}

/// The caller behind a request. Built once per request by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == UserRole::Admin
    }

    pub fn can(&self, capability: Capability) -> bool {
        has_capability(self.user.role, capability)
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        role_capabilities(self.user.role)
    }

    /// Forbidden unless the caller's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if self.can(capability) {
            return Ok(());
        }

        tracing::warn!(
            "Permission denied: user {} ({}) lacks {}",
            self.user.username,
            self.user.role,
            capability.as_str()
        );
        Err(ApiError::Forbidden(format!(
            "Requires '{}' permission",
            capability.as_str()
        )))
    }
}

#[cfg(test)]
pub(crate) fn test_user(id: i64, role: UserRole) -> AuthenticatedUser {
    AuthenticatedUser {
        user: User {
            id,
            username: format!("{}-{}", role, id),
            email: None,
            full_name: format!("Test {}", role),
            role,
            password_hash: String::new(),
            is_active: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        },
        session: Session::new(id, "token".to_string(), 1),
        token: "token".to_string(),
    }
}
