use crate::domain::entities::Notification;
use crate::infrastructure::http::middleware::error::ApiResult;

/// Repository for notification operations
#[async_trait::async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(&self, notification: &Notification) -> ApiResult<()>;

    /// Newest first.
    async fn list_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<Notification>>;

    async fn get_notification_by_id(&self, id: &str) -> ApiResult<Option<Notification>>;

    async fn get_unread_count(&self, user_id: i64) -> ApiResult<i64>;

    async fn mark_notification_as_read(&self, id: &str, read_at: &str) -> ApiResult<()>;

    async fn mark_all_notifications_as_read(&self, user_id: i64, read_at: &str)
        -> ApiResult<u64>;

    async fn delete_notifications_before(&self, cutoff: &str) -> ApiResult<u64>;
}
