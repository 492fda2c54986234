use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{error, info};

use crate::domain::entities::{Notification, NotificationDraft, UserRole};
use crate::domain::ports::{
    notification_repository::NotificationRepository, time_service::Clock,
    user_repository::UserRepository,
};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::to_rfc3339;

pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 50;
pub const MAX_NOTIFICATION_LIMIT: i64 = 100;
pub const NOTIFICATION_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

/// In-app notifications. Fan-out helpers never fail the calling operation;
/// delivery errors are logged per recipient.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: Arc<dyn NotificationRepository>,
    user_repo: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        notification_repo: Arc<dyn NotificationRepository>,
        user_repo: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            clock,
        }
    }

    pub async fn create_notification(
        &self,
        user_id: i64,
        draft: &NotificationDraft,
    ) -> ApiResult<Notification> {
        let notification = draft.addressed_to(user_id, to_rfc3339(self.clock.now()));
        self.notification_repo
            .create_notification(&notification)
            .await?;
        Ok(notification)
    }

    /// Sends `draft` to each distinct user. Returns how many were stored.
    pub async fn notify_users<I>(&self, user_ids: I, draft: &NotificationDraft) -> usize
    where
        I: IntoIterator<Item = i64>,
    {
        let recipients: BTreeSet<i64> = user_ids.into_iter().collect();
        let mut sent = 0;

        for user_id in recipients {
            match self.create_notification(user_id, draft).await {
                Ok(_) => sent += 1,
                Err(e) => error!(
                    "Failed to send {} notification to user {}: {}",
                    draft.notification_type.as_str(),
                    user_id,
                    e
                ),
            }
        }

        sent
    }

    /// Sends `draft` to every active user holding one of `roles`, plus any
    /// `extra` users.
    pub async fn notify_roles(
        &self,
        roles: &[UserRole],
        extra: Option<i64>,
        draft: &NotificationDraft,
    ) -> usize {
        let mut recipients: Vec<i64> = extra.into_iter().collect();

        for role in roles {
            match self.user_repo.list_active_user_ids_by_role(*role).await {
                Ok(ids) => recipients.extend(ids),
                Err(e) => error!("Failed to resolve {} recipients: {}", role, e),
            }
        }

        self.notify_users(recipients, draft).await
    }

    pub async fn list_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ApiResult<NotificationPage> {
        let limit = limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT);
        if !(1..=MAX_NOTIFICATION_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_NOTIFICATION_LIMIT
            )));
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::BadRequest("offset must not be negative".to_string()));
        }

        let notifications = self
            .notification_repo
            .list_notifications(user_id, unread_only, limit, offset)
            .await?;
        let unread_count = self.notification_repo.get_unread_count(user_id).await?;

        Ok(NotificationPage {
            notifications,
            unread_count,
        })
    }

    pub async fn unread_count(&self, user_id: i64) -> ApiResult<i64> {
        self.notification_repo.get_unread_count(user_id).await
    }

    /// Someone else's notification is reported as missing.
    pub async fn mark_read(&self, user_id: i64, notification_id: &str) -> ApiResult<Notification> {
        let mut notification = self
            .notification_repo
            .get_notification_by_id(notification_id)
            .await?
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

        if !notification.is_read {
            let read_at = to_rfc3339(self.clock.now());
            self.notification_repo
                .mark_notification_as_read(notification_id, &read_at)
                .await?;
            notification.is_read = true;
            notification.read_at = Some(read_at);
        }

        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: i64) -> ApiResult<u64> {
        let read_at = to_rfc3339(self.clock.now());
        self.notification_repo
            .mark_all_notifications_as_read(user_id, &read_at)
            .await
    }

    pub async fn cleanup_old_notifications(&self) -> ApiResult<u64> {
        let cutoff = self.clock.now() - Duration::days(NOTIFICATION_RETENTION_DAYS);
        let deleted = self
            .notification_repo
            .delete_notifications_before(&to_rfc3339(cutoff))
            .await?;

        if deleted > 0 {
            info!("Deleted {} notifications older than {} days", deleted, NOTIFICATION_RETENTION_DAYS);
        }
        Ok(deleted)
    }
}
