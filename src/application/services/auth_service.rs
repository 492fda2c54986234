use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use tracing::{info, warn};

use crate::domain::entities::{NewUser, Session, User, UserRole};
use crate::domain::ports::{session_repository::SessionRepository, user_repository::UserRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::rate_limiter::LoginRateLimiter;

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Password rules:
/// - 10-72 characters long
/// - at least one uppercase letter, lowercase letter, digit and special character
pub fn validate_password_complexity(password: &str) -> ApiResult<()> {
    let len = password.len();
    if !(10..=72).contains(&len) {
        return Err(ApiError::BadRequest(
            "Password must be 10-72 characters long".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ApiError::BadRequest(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ApiError::BadRequest(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "Password must contain at least one digit".to_string(),
        ));
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(ApiError::BadRequest(format!(
            "Password must contain at least one special character ({})",
            PASSWORD_SPECIAL_CHARS
        )));
    }

    Ok(())
}

/// Hash password using Argon2id with parameters:
/// - m_cost = 19456 KiB (19 MiB)
/// - t_cost = 2 iterations
/// - p_cost = 1 thread
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19456)
        .t_cost(2)
        .p_cost(1)
        .build()
        .map_err(|_| ApiError::Internal("Failed to build Argon2 params".to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Parameters are read back from the PHC string, so older hashes keep verifying.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 32 random bytes, hex encoded (64 characters).
pub fn generate_session_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

pub struct LoginResult {
    pub session: Session,
    pub user: User,
}

/// Login, logout and per-request session resolution.
#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    rate_limiter: LoginRateLimiter,
    session_duration_hours: i64,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        rate_limiter: LoginRateLimiter,
        session_duration_hours: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            rate_limiter,
            session_duration_hours,
        }
    }

    pub fn rate_limiter(&self) -> &LoginRateLimiter {
        &self.rate_limiter
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResult> {
        let username = username.trim().to_lowercase();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        if let Err(wait) = self.rate_limiter.check(&username).await {
            warn!("Login rate limited for {}", username);
            return Err(ApiError::TooManyRequests(format!(
                "Too many login attempts. Try again in {} seconds",
                wait.as_secs().max(1)
            )));
        }

        // Unknown user and wrong password look the same to the caller
        let user = self
            .user_repo
            .get_user_by_username(&username)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for {}", username);
            return Err(ApiError::Unauthorized);
        }

        if !user.is_active {
            return Err(ApiError::Forbidden("Account is deactivated".to_string()));
        }

        self.rate_limiter.reset(&username).await;

        let session = Session::new(
            user.id,
            generate_session_token(),
            self.session_duration_hours,
        );
        self.session_repo.create_session(&session).await?;

        metrics::counter!("printdesk_logins_total", "role" => user.role.as_str()).increment(1);
        info!("User {} logged in as {}", user.username, user.role);

        Ok(LoginResult { session, user })
    }

    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        self.session_repo.delete_session(token).await
    }

    /// Session and user behind a bearer token. Expired sessions are removed
    /// and deactivated users are rejected.
    pub async fn resolve_session(&self, token: &str) -> ApiResult<(Session, User)> {
        let session = self
            .session_repo
            .get_session_by_token(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        if session.is_expired() {
            self.session_repo.delete_session(token).await.ok();
            return Err(ApiError::Unauthorized);
        }

        let user = self
            .user_repo
            .get_user_by_id(session.user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        if !user.is_active {
            self.session_repo.delete_session(token).await.ok();
            return Err(ApiError::Unauthorized);
        }

        let _ = self.session_repo.update_session_last_accessed(token).await;

        Ok((session, user))
    }

    pub async fn cleanup_expired_sessions(&self) -> ApiResult<u64> {
        self.session_repo.cleanup_expired_sessions().await
    }

    /// Creates the bootstrap admin when no user with `username` exists.
    /// Returns true when an account was created.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> ApiResult<bool> {
        if self.user_repo.get_user_by_username(username).await?.is_some() {
            return Ok(false);
        }

        validate_password_complexity(password)?;
        let user = self
            .user_repo
            .create_user(&NewUser {
                username: username.to_string(),
                email: None,
                full_name: "Administrator".to_string(),
                role: UserRole::Admin,
                password_hash: hash_password(password)?,
            })
            .await?;

        info!("Created admin user {} (id {})", user.username, user.id);
        Ok(true)
    }
}
