use sqlx::{any::AnyRow, Row};

use crate::domain::entities::Notification;
use crate::domain::ports::notification_repository::NotificationRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{nullable, Database};

const NOTIFICATION_COLUMNS: &str = "id, user_id, notification_type, title, message, priority,
     module, action_url, is_read, created_at, read_at";

fn notification_from_row(row: &AnyRow) -> ApiResult<Notification> {
    let notification_type: String = row.try_get("notification_type")?;
    let priority: String = row.try_get("priority")?;
    let is_read: i32 = row.try_get("is_read")?;

    Ok(Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        notification_type: notification_type.parse().map_err(ApiError::Internal)?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        priority: priority.parse().map_err(ApiError::Internal)?,
        module: row.try_get("module")?,
        action_url: nullable(row, "action_url")?,
        is_read: is_read != 0,
        created_at: row.try_get("created_at")?,
        read_at: nullable(row, "read_at")?,
    })
}

#[async_trait::async_trait]
impl NotificationRepository for Database {
    async fn create_notification(&self, notification: &Notification) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO notifications (
                id, user_id, notification_type, title, message, priority, module, action_url,
                is_read, created_at, read_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&notification.id)
        .bind(notification.user_id)
        .bind(notification.notification_type.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.priority.as_str())
        .bind(&notification.module)
        .bind(&notification.action_url)
        .bind(if notification.is_read { 1 } else { 0 })
        .bind(&notification.created_at)
        .bind(&notification.read_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notifications
             WHERE user_id = ? AND (? = 0 OR is_read = 0)
             ORDER BY created_at DESC
             LIMIT ? OFFSET ?",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(if unread_only { 1 } else { 0 })
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(notification_from_row).collect()
    }

    async fn get_notification_by_id(&self, id: &str) -> ApiResult<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM notifications WHERE id = ?",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(notification_from_row).transpose()
    }

    async fn get_unread_count(&self, user_id: i64) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count
             FROM notifications
             WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("count")?)
    }

    async fn mark_notification_as_read(&self, id: &str, read_at: &str) -> ApiResult<()> {
        sqlx::query(
            "UPDATE notifications
             SET is_read = 1, read_at = COALESCE(read_at, ?)
             WHERE id = ?",
        )
        .bind(read_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_all_notifications_as_read(
        &self,
        user_id: i64,
        read_at: &str,
    ) -> ApiResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications
             SET is_read = 1, read_at = ?
             WHERE user_id = ? AND is_read = 0",
        )
        .bind(read_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_notifications_before(&self, cutoff: &str) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
