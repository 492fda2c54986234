use crate::domain::entities::{NewUser, User, UserRole};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> ApiResult<User>;
    async fn get_user_by_id(&self, id: i64) -> ApiResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> ApiResult<Option<User>>;
    async fn list_users(&self, role_filter: Option<UserRole>) -> ApiResult<Vec<User>>;
    /// Ids of active users holding `role`, used for broadcast notifications.
    async fn list_active_user_ids_by_role(&self, role: UserRole) -> ApiResult<Vec<i64>>;
    async fn set_user_active(&self, id: i64, is_active: bool) -> ApiResult<()>;
}
