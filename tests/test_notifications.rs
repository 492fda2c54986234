mod helpers;

use chrono::Duration;
use helpers::*;
use printdesk::domain::entities::{
    NotificationDraft, NotificationPriority, NotificationType, UserRole,
};
use printdesk::infrastructure::http::middleware::ApiError;

fn order_news() -> NotificationDraft {
    NotificationDraft::new(
        NotificationType::OrderApproved,
        "Order Approved: ORD1",
        "Invoice INV-20260504-0001",
    )
    .with_priority(NotificationPriority::High)
    .with_action_url("/salesman/orders/1")
}

#[tokio::test]
async fn test_fan_out_skips_duplicates_and_inactive_staff() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let retired = app.user("oldboss", UserRole::Admin).await;
    let reception = app.user("frontdesk", UserRole::Reception).await;
    let notifications = &app.services.state.notification_service;

    app.services
        .state
        .user_service
        .deactivate_user(&as_caller(&admin), retired.id)
        .await
        .unwrap();

    // The admin is named twice: once directly, once through the role
    let sent = notifications
        .notify_roles(
            &[UserRole::Admin, UserRole::Reception],
            Some(admin.id),
            &order_news(),
        )
        .await;

    assert_eq!(sent, 2);
    assert_eq!(notifications.unread_count(admin.id).await.unwrap(), 1);
    assert_eq!(notifications.unread_count(reception.id).await.unwrap(), 1);
    assert_eq!(notifications.unread_count(retired.id).await.unwrap(), 0);

    let page = notifications
        .list_notifications(admin.id, false, None, None)
        .await
        .unwrap();
    let stored = &page.notifications[0];
    assert_eq!(stored.module, "orders");
    assert_eq!(stored.priority, NotificationPriority::High);
    assert_eq!(stored.action_url.as_deref(), Some("/salesman/orders/1"));
}

#[tokio::test]
async fn test_mark_read_is_owner_only() {
    let app = TestApp::new().await;
    let owner = app.user("sunil", UserRole::Salesman).await;
    let snoop = app.user("kiran", UserRole::Salesman).await;
    let notifications = &app.services.state.notification_service;

    let notification = notifications
        .create_notification(owner.id, &order_news())
        .await
        .unwrap();

    assert!(matches!(
        notifications.mark_read(snoop.id, &notification.id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        notifications.mark_read(owner.id, "no-such-id").await,
        Err(ApiError::NotFound(_))
    ));

    app.clock.advance(Duration::minutes(10));
    let read = notifications
        .mark_read(owner.id, &notification.id)
        .await
        .unwrap();
    assert!(read.is_read);
    let first_read_at = read.read_at.clone();
    assert!(first_read_at.is_some());

    // Reading twice keeps the original timestamp
    app.clock.advance(Duration::minutes(10));
    let again = notifications
        .mark_read(owner.id, &notification.id)
        .await
        .unwrap();
    assert_eq!(again.read_at, first_read_at);
    assert_eq!(notifications.unread_count(owner.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_listing_paging_and_mark_all() {
    let app = TestApp::new().await;
    let user = app.user("sunil", UserRole::Salesman).await;
    let notifications = &app.services.state.notification_service;

    for _ in 0..3 {
        notifications
            .create_notification(user.id, &order_news())
            .await
            .unwrap();
        app.clock.advance(Duration::minutes(1));
    }

    let page = notifications
        .list_notifications(user.id, false, Some(2), None)
        .await
        .unwrap();
    assert_eq!(page.notifications.len(), 2);
    assert_eq!(page.unread_count, 3);

    for bad in [Some(0), Some(101)] {
        assert!(matches!(
            notifications.list_notifications(user.id, false, bad, None).await,
            Err(ApiError::BadRequest(_))
        ));
    }
    assert!(matches!(
        notifications
            .list_notifications(user.id, false, None, Some(-1))
            .await,
        Err(ApiError::BadRequest(_))
    ));

    assert_eq!(notifications.mark_all_read(user.id).await.unwrap(), 3);
    assert_eq!(notifications.mark_all_read(user.id).await.unwrap(), 0);
    let unread = notifications
        .list_notifications(user.id, true, None, None)
        .await
        .unwrap();
    assert!(unread.notifications.is_empty());
    assert_eq!(unread.unread_count, 0);
}

#[tokio::test]
async fn test_cleanup_drops_notifications_past_retention() {
    let app = TestApp::new().await;
    let user = app.user("sunil", UserRole::Salesman).await;
    let notifications = &app.services.state.notification_service;

    notifications
        .create_notification(user.id, &order_news())
        .await
        .unwrap();
    app.clock.advance(Duration::days(20));
    notifications
        .create_notification(user.id, &order_news())
        .await
        .unwrap();

    app.clock.advance(Duration::days(15));
    assert_eq!(notifications.cleanup_old_notifications().await.unwrap(), 1);
    assert_eq!(notifications.unread_count(user.id).await.unwrap(), 1);
}
