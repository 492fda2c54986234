mod helpers;

use chrono::Duration;
use helpers::*;
use printdesk::application::services::{CreateServiceRequest, StatusUpdateRequest};
use printdesk::domain::entities::{Priority, TicketStatus, UserRole};
use printdesk::domain::ports::ServiceRequestRepository;

fn ticket(priority: Priority, engineer: i64) -> CreateServiceRequest {
    CreateServiceRequest {
        customer_name: "Sharma Xerox Point".to_string(),
        phone: Some("9123456780".to_string()),
        priority,
        assigned_to: Some(engineer),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_warning_then_breach_are_each_sent_once() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let reception = app.user("frontdesk", UserRole::Reception).await;
    let engineer = app.user("ravi", UserRole::ServiceEngineer).await;
    let monitor = &app.services.sla_monitor;

    let created = app
        .services
        .state
        .service_request_service
        .create(&as_caller(&reception), ticket(Priority::Urgent, engineer.id))
        .await
        .unwrap();

    // Plenty of time left
    let summary = monitor.check_sla_escalations().await.unwrap();
    assert_eq!(summary.checked, 1);
    assert_eq!(summary.warnings_sent, 0);
    assert_eq!(summary.breaches_sent, 0);

    // 90 minutes left
    app.clock.advance(Duration::minutes(270));
    let summary = monitor.check_sla_escalations().await.unwrap();
    assert_eq!(summary.warnings_sent, 1);
    assert_eq!(summary.breaches_sent, 0);

    let stored = app
        .db()
        .get_service_request(created.request.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.sla_warning_sent);
    assert!(!stored.sla_breach_sent);

    // Running again inside the window sends nothing new
    let summary = monitor.check_sla_escalations().await.unwrap();
    assert_eq!(summary.warnings_sent, 0);

    app.clock.advance(Duration::hours(2));
    let summary = monitor.check_sla_escalations().await.unwrap();
    assert_eq!(summary.breaches_sent, 1);
    let summary = monitor.check_sla_escalations().await.unwrap();
    assert_eq!(summary.breaches_sent, 0);

    // service_assigned, then the escalations (newest first)
    assert_eq!(
        app.notification_types(engineer.id).await,
        vec!["sla_breach", "sla_warning", "service_assigned"]
    );
    assert_eq!(
        app.notification_types(admin.id).await,
        vec!["sla_breach", "sla_warning"]
    );
    // The front desk only hears about breaches
    assert_eq!(app.notification_types(reception.id).await, vec!["sla_breach"]);
}

#[tokio::test]
async fn test_ticket_that_skips_the_warning_goes_straight_to_breach() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let engineer = app.user("ravi", UserRole::ServiceEngineer).await;

    app.services
        .state
        .service_request_service
        .create(&as_caller(&admin), ticket(Priority::Critical, engineer.id))
        .await
        .unwrap();

    app.clock.advance(Duration::hours(5));
    let summary = app.services.sla_monitor.check_sla_escalations().await.unwrap();

    assert_eq!(summary.breaches_sent, 1);
    assert_eq!(summary.warnings_sent, 0);
    assert_eq!(
        app.notification_types(admin.id).await,
        vec!["sla_breach"]
    );
}

#[tokio::test]
async fn test_completed_tickets_are_not_escalated() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&as_caller(&admin), ticket(Priority::Critical, engineer_user.id))
        .await
        .unwrap()
        .request
        .id;
    for status in [TicketStatus::OnTheWay, TicketStatus::InProgress] {
        service
            .update_status(
                &engineer,
                id,
                StatusUpdateRequest {
                    status,
                    resolution_notes: None,
                    parts_replaced: None,
                },
            )
            .await
            .unwrap();
    }
    service
        .update_status(
            &engineer,
            id,
            StatusUpdateRequest {
                status: TicketStatus::Completed,
                resolution_notes: Some("Drum cleaned".to_string()),
                parts_replaced: None,
            },
        )
        .await
        .unwrap();

    app.clock.advance(Duration::days(2));
    let summary = app.services.sla_monitor.check_sla_escalations().await.unwrap();

    assert_eq!(summary.checked, 0);
    assert_eq!(summary.breaches_sent, 0);
}

#[tokio::test]
async fn test_unassigned_breach_still_reaches_the_office() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let reception = app.user("frontdesk", UserRole::Reception).await;

    app.services
        .state
        .service_request_service
        .create_public(CreateServiceRequest {
            customer_name: "Anonymous".to_string(),
            phone: Some("9000000001".to_string()),
            priority: Priority::Normal,
            ..Default::default()
        })
        .await
        .unwrap();

    app.clock.advance(Duration::hours(25));
    let summary = app.services.sla_monitor.check_sla_escalations().await.unwrap();
    assert_eq!(summary.breaches_sent, 1);

    assert_eq!(
        app.notification_types(admin.id).await,
        vec!["sla_breach", "service_new"]
    );
    assert_eq!(
        app.notification_types(reception.id).await,
        vec!["sla_breach", "service_new"]
    );
}
