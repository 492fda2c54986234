mod helpers;

use chrono::Duration;
use helpers::*;
use printdesk::application::services::{
    CreateServiceRequest, ServiceRequestQuery, StatusUpdateRequest,
};
use printdesk::domain::entities::{Priority, TicketStatus, UserRole};
use printdesk::domain::ports::ServiceRequestRepository;
use printdesk::domain::services::SlaKind;
use printdesk::infrastructure::http::middleware::ApiError;

fn walk_in(customer: &str, priority: Priority, engineer: Option<i64>) -> CreateServiceRequest {
    CreateServiceRequest {
        customer_name: customer.to_string(),
        phone: Some("98765 43210".to_string()),
        machine_model: Some("LaserJet M404".to_string()),
        fault_description: Some("Paper jam on every print".to_string()),
        priority,
        assigned_to: engineer,
        ..Default::default()
    }
}

fn move_to(status: TicketStatus) -> StatusUpdateRequest {
    StatusUpdateRequest {
        status,
        resolution_notes: None,
        parts_replaced: None,
    }
}

#[tokio::test]
async fn test_create_assigns_engineer_and_notifies() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer = app.user("ravi", UserRole::ServiceEngineer).await;
    let service = &app.services.state.service_request_service;

    let view = service
        .create(&reception, walk_in("Acme Traders", Priority::Urgent, Some(engineer.id)))
        .await
        .unwrap();

    assert_eq!(view.request.status, TicketStatus::Assigned);
    assert_eq!(view.request.assigned_to, Some(engineer.id));
    assert_eq!(view.request.phone.as_deref(), Some("9876543210"));
    assert!(view.request.ticket_no.starts_with("SR20260504"));
    assert_eq!(view.sla.kind, SlaKind::Ok);
    assert_eq!(view.sla.display.as_deref(), Some("6h 0m"));
    assert_eq!(
        view.sla.allowed_next_statuses,
        vec![TicketStatus::OnTheWay, TicketStatus::OnHold]
    );

    assert_eq!(app.notification_types(engineer.id).await, vec!["service_assigned"]);
}

#[tokio::test]
async fn test_create_rejects_non_engineer_assignee() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let salesman = app.user("sunil", UserRole::Salesman).await;

    let result = app
        .services
        .state
        .service_request_service
        .create(&reception, walk_in("Acme", Priority::Normal, Some(salesman.id)))
        .await;

    assert!(matches!(result, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn test_salesman_cannot_create_tickets() {
    let app = TestApp::new().await;
    let salesman = app.caller("sunil", UserRole::Salesman).await;

    let result = app
        .services
        .state
        .service_request_service
        .create(&salesman, walk_in("Acme", Priority::Normal, None))
        .await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_engineer_walks_ticket_to_completion() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&reception, walk_in("Acme", Priority::Normal, Some(engineer_user.id)))
        .await
        .unwrap()
        .request
        .id;

    // Skipping ahead is not allowed
    let skipped = service
        .update_status(&engineer, id, move_to(TicketStatus::Completed))
        .await;
    assert!(matches!(skipped, Err(ApiError::BadRequest(_))));

    service
        .update_status(&engineer, id, move_to(TicketStatus::OnTheWay))
        .await
        .unwrap();
    app.clock.advance(Duration::hours(1));
    let in_progress = service
        .update_status(&engineer, id, move_to(TicketStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(
        in_progress.sla.allowed_next_statuses,
        vec![TicketStatus::OnHold, TicketStatus::Completed]
    );

    // Completion needs resolution notes
    let missing_notes = service
        .update_status(&engineer, id, move_to(TicketStatus::Completed))
        .await;
    assert!(matches!(missing_notes, Err(ApiError::BadRequest(_))));

    let completed = service
        .update_status(
            &engineer,
            id,
            StatusUpdateRequest {
                status: TicketStatus::Completed,
                resolution_notes: Some("Replaced pickup roller".to_string()),
                parts_replaced: Some("Pickup roller".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(completed.request.status, TicketStatus::Completed);
    assert_eq!(completed.request.completed_at, Some(app.clock_now()));
    assert_eq!(
        completed.request.feedback_url.as_deref(),
        Some(format!("https://printdesk.test/feedback/{}", id).as_str())
    );
    assert_eq!(completed.sla.kind, SlaKind::Completed);
    assert!(completed.sla.allowed_next_statuses.is_empty());

    // Persisted, not just echoed
    let stored = service.get(&engineer, id).await.unwrap();
    assert_eq!(
        stored.request.resolution_notes.as_deref(),
        Some("Replaced pickup roller")
    );
    assert_eq!(stored.request.parts_replaced.as_deref(), Some("Pickup roller"));

    // Finished inside the deadline, so no breach notice
    assert_eq!(app.notification_types(admin.id).await, vec!["service_completed"]);

    // Terminal: no way back
    let reopened = service
        .update_status(&engineer, id, move_to(TicketStatus::InProgress))
        .await;
    assert!(matches!(reopened, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn test_late_completion_tells_admin_about_the_breach() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&reception, walk_in("Acme", Priority::Critical, Some(engineer_user.id)))
        .await
        .unwrap()
        .request
        .id;

    for status in [TicketStatus::OnTheWay, TicketStatus::InProgress] {
        service.update_status(&engineer, id, move_to(status)).await.unwrap();
    }
    app.clock.advance(Duration::hours(3));
    service
        .update_status(
            &engineer,
            id,
            StatusUpdateRequest {
                status: TicketStatus::Completed,
                resolution_notes: Some("Fuser unit swapped".to_string()),
                parts_replaced: None,
            },
        )
        .await
        .unwrap();

    let mut types = app.notification_types(admin.id).await;
    types.sort();
    assert_eq!(types, vec!["service_completed", "sla_breach"]);
}

#[tokio::test]
async fn test_concurrent_status_updates_do_not_both_land() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&reception, walk_in("Acme", Priority::Normal, Some(engineer_user.id)))
        .await
        .unwrap()
        .request
        .id;
    for status in [TicketStatus::OnTheWay, TicketStatus::InProgress] {
        service.update_status(&engineer, id, move_to(status)).await.unwrap();
    }

    let (completed, held) = tokio::join!(
        service.update_status(
            &engineer,
            id,
            StatusUpdateRequest {
                status: TicketStatus::Completed,
                resolution_notes: Some("Cleaned rollers".to_string()),
                parts_replaced: None,
            },
        ),
        service.update_status(&engineer, id, move_to(TicketStatus::OnHold)),
    );

    let winner = match (completed, held) {
        (Ok(view), Err(ApiError::Conflict(_) | ApiError::BadRequest(_)))
        | (Err(ApiError::Conflict(_) | ApiError::BadRequest(_)), Ok(view)) => view.request.status,
        other => panic!("exactly one update should land: {:?}", other),
    };

    let stored = service.get(&engineer, id).await.unwrap();
    assert_eq!(stored.request.status, winner);
}

#[tokio::test]
async fn test_stale_status_write_is_refused() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&reception, walk_in("Acme", Priority::Normal, Some(engineer_user.id)))
        .await
        .unwrap()
        .request
        .id;

    // A writer that read the ticket while it was still ASSIGNED
    let mut stale = app.db().get_service_request(id).await.unwrap().unwrap();
    service
        .update_status(&engineer, id, move_to(TicketStatus::OnTheWay))
        .await
        .unwrap();

    stale.status = TicketStatus::OnHold;
    let applied = app
        .db()
        .update_service_request_status(&stale, TicketStatus::Assigned)
        .await
        .unwrap();
    assert!(!applied);

    let stored = app.db().get_service_request(id).await.unwrap().unwrap();
    assert_eq!(stored.status, TicketStatus::OnTheWay);
}

#[tokio::test]
async fn test_engineer_cannot_touch_someone_elses_ticket() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let owner = app.user("ravi", UserRole::ServiceEngineer).await;
    let other = app.caller("meena", UserRole::ServiceEngineer).await;
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&reception, walk_in("Acme", Priority::Normal, Some(owner.id)))
        .await
        .unwrap()
        .request
        .id;

    assert!(matches!(
        service
            .update_status(&other, id, move_to(TicketStatus::OnTheWay))
            .await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        service.get(&other, id).await,
        Err(ApiError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_reassignment_notifies_only_the_new_engineer() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let first = app.user("ravi", UserRole::ServiceEngineer).await;
    let second = app.user("meena", UserRole::ServiceEngineer).await;
    let service = &app.services.state.service_request_service;

    let id = service
        .create(&reception, walk_in("Acme", Priority::Normal, None))
        .await
        .unwrap()
        .request
        .id;

    service.assign(&reception, id, first.id).await.unwrap();
    // Same engineer again is not a new assignment
    service.assign(&reception, id, first.id).await.unwrap();
    let view = service.assign(&reception, id, second.id).await.unwrap();

    assert_eq!(view.request.assigned_to, Some(second.id));
    assert_eq!(app.notification_types(first.id).await.len(), 1);
    assert_eq!(app.notification_types(second.id).await.len(), 1);
}

#[tokio::test]
async fn test_public_intake_and_tracking() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let reception = app.user("frontdesk", UserRole::Reception).await;
    let service = &app.services.state.service_request_service;

    let no_phone = service
        .create_public(CreateServiceRequest {
            customer_name: "Walk-in".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(no_phone, Err(ApiError::BadRequest(_))));

    let first = service
        .create_public(walk_in("Acme", Priority::Normal, Some(admin.id)))
        .await
        .unwrap();
    assert_eq!(first.request.assigned_to, None);
    assert_eq!(first.request.status, TicketStatus::Assigned);

    app.clock.advance(Duration::minutes(5));
    let second = service
        .create_public(walk_in("Acme", Priority::Urgent, None))
        .await
        .unwrap();

    for staff in [admin.id, reception.id] {
        assert_eq!(
            app.notification_types(staff).await,
            vec!["service_new", "service_new"]
        );
    }

    // Ticket numbers are matched case-insensitively
    let by_ticket = service
        .track(&first.request.ticket_no.to_lowercase())
        .await
        .unwrap();
    assert_eq!(by_ticket.len(), 1);
    assert_eq!(by_ticket[0].request.id, first.request.id);

    // Phone lookups ignore formatting and list newest first
    let by_phone = service.track("+91 ").await;
    assert!(matches!(by_phone, Err(ApiError::NotFound(_))));
    let by_phone = service.track("98765-43210").await.unwrap();
    let ids: Vec<i64> = by_phone.iter().map(|v| v.request.id).collect();
    assert_eq!(ids, vec![second.request.id, first.request.id]);

    assert!(matches!(
        service.track("SR20990101ZZZZZZ").await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_filters_by_derived_sla_state() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let service = &app.services.state.service_request_service;

    let relaxed = service
        .create(&reception, walk_in("Slow Co", Priority::Normal, None))
        .await
        .unwrap();
    let critical = service
        .create(&reception, walk_in("Rush Co", Priority::Critical, None))
        .await
        .unwrap();

    app.clock.advance(Duration::hours(1));

    let warning = service
        .list(
            &reception,
            ServiceRequestQuery {
                sla: Some(SlaKind::Warning),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(warning.service_requests.len(), 1);
    assert_eq!(warning.service_requests[0].request.id, critical.request.id);
    assert_eq!(warning.service_requests[0].sla.display.as_deref(), Some("1h 0m"));

    let by_priority = service
        .list(
            &reception,
            ServiceRequestQuery {
                priority: Some(Priority::Normal),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_priority.service_requests.len(), 1);
    assert_eq!(by_priority.service_requests[0].request.id, relaxed.request.id);

    let bad_page = service
        .list(
            &reception,
            ServiceRequestQuery {
                limit: Some(0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_page, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn test_my_tickets_puts_most_urgent_first() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    let normal = service
        .create(&reception, walk_in("Calm", Priority::Normal, Some(engineer_user.id)))
        .await
        .unwrap();
    let critical = service
        .create(&reception, walk_in("Fire", Priority::Critical, Some(engineer_user.id)))
        .await
        .unwrap();

    app.clock.advance(Duration::hours(3));

    let queue = service.my_tickets(&engineer, None, None).await.unwrap();
    let ids: Vec<i64> = queue.iter().map(|v| v.request.id).collect();
    assert_eq!(ids, vec![critical.request.id, normal.request.id]);
    assert_eq!(queue[0].sla.kind, SlaKind::Breached);

    // Admins must say whose queue they want
    let admin = app.caller("boss", UserRole::Admin).await;
    assert!(matches!(
        service.my_tickets(&admin, None, None).await,
        Err(ApiError::BadRequest(_))
    ));
    assert_eq!(
        service
            .my_tickets(&admin, Some(engineer_user.id), None)
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(matches!(
        service.my_tickets(&reception, None, None).await,
        Err(ApiError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_engineer_stats_count_breaches() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer_user = app.user("ravi", UserRole::ServiceEngineer).await;
    let engineer = as_caller(&engineer_user);
    let service = &app.services.state.service_request_service;

    service
        .create(&reception, walk_in("Calm", Priority::Normal, Some(engineer_user.id)))
        .await
        .unwrap();
    service
        .create(&reception, walk_in("Fire", Priority::Critical, Some(engineer_user.id)))
        .await
        .unwrap();

    app.clock.advance(Duration::hours(3));

    let stats = service
        .engineer_stats(&engineer, engineer_user.id, None, None)
        .await
        .unwrap();
    assert_eq!(stats.total_jobs, 2);
    assert_eq!(stats.sla_breached, 1);
    assert_eq!(stats.sla_compliant, 1);
    assert_eq!(stats.compliance_percentage, 50.0);

    // Someone else's numbers need reporting access
    let other = app.caller("meena", UserRole::ServiceEngineer).await;
    assert!(matches!(
        service.engineer_stats(&other, engineer_user.id, None, None).await,
        Err(ApiError::Forbidden(_))
    ));

    let now = app.clock_now();
    assert!(matches!(
        service
            .engineer_stats(&reception, engineer_user.id, Some(now), Some(now - Duration::days(1)))
            .await,
        Err(ApiError::BadRequest(_))
    ));
}
