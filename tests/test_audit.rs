mod helpers;

use helpers::*;
use printdesk::application::services::{
    AuditQuery, CreateEnquiryRequest, CreateOrderRequest, CreateServiceRequest,
    StatusUpdateRequest,
};
use printdesk::domain::entities::{AuditAction, AuditModule, TicketStatus, UserRole};
use printdesk::infrastructure::http::middleware::ApiError;
use serde_json::json;

#[tokio::test]
async fn test_ticket_history_follows_assignment_and_status() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let ravi = app.user("ravi", UserRole::ServiceEngineer).await;
    let meena = app.user("meena", UserRole::ServiceEngineer).await;
    let service = &app.services.state.service_request_service;
    let audit = &app.services.state.audit_service;

    let id = service
        .create(
            &reception,
            CreateServiceRequest {
                customer_name: "Acme".to_string(),
                assigned_to: Some(ravi.id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .request
        .id;
    service.assign(&reception, id, meena.id).await.unwrap();
    service
        .update_status(
            &as_caller(&meena),
            id,
            StatusUpdateRequest {
                status: TicketStatus::OnTheWay,
                resolution_notes: None,
                parts_replaced: None,
            },
        )
        .await
        .unwrap();

    let history = audit
        .record_history(&reception, AuditModule::ServiceRequests, id)
        .await
        .unwrap();
    let actions: Vec<AuditAction> = history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::Create, AuditAction::Assign, AuditAction::StatusChange]
    );
    assert_eq!(history[1].changes, Some(json!({ "from": ravi.id, "to": meena.id })));
    assert_eq!(
        history[2].changes,
        Some(json!({ "from": "ASSIGNED", "to": "ON_THE_WAY" }))
    );
    assert_eq!(history[2].username, "meena");
    assert_eq!(history[2].user_id, Some(meena.id));
}

#[tokio::test]
async fn test_order_decisions_are_listed_newest_first() {
    let app = TestApp::new().await;
    let admin = app.caller("boss", UserRole::Admin).await;
    let enquiries = &app.services.state.enquiry_service;
    let orders = &app.services.state.order_service;
    let audit = &app.services.state.audit_service;

    let mut order_ids = Vec::new();
    for customer in ["Gupta Stationers", "Sharma Prints"] {
        let enquiry = enquiries
            .create(
                &admin,
                CreateEnquiryRequest {
                    customer_name: customer.to_string(),
                    phone: Some("9988776655".to_string()),
                    product_interest: Some("Canon iR 2425".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let order = orders
            .create(
                &admin,
                CreateOrderRequest {
                    enquiry_id: enquiry.id,
                    quantity: 1,
                    unit_price: 12_500.0,
                    discount_percent: 0.0,
                    product_name: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        order_ids.push(order.id);
    }

    orders.approve(&admin, order_ids[0]).await.unwrap();
    orders
        .reject(&admin, order_ids[1], Some("  Credit limit exceeded ".to_string()))
        .await
        .unwrap();

    let entries = audit
        .list(
            &admin,
            AuditQuery {
                module: Some(AuditModule::Orders),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, AuditAction::Reject);
    assert_eq!(entries[0].record_id, order_ids[1]);
    assert_eq!(
        entries[0].changes,
        Some(json!({ "reason": "Credit limit exceeded" }))
    );
    assert_eq!(entries[1].action, AuditAction::Approve);
    assert_eq!(entries[1].record_id, order_ids[0]);

    let approvals = audit
        .list(
            &admin,
            AuditQuery {
                action: Some(AuditAction::Approve),
                limit: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].record_id, order_ids[0]);
}

#[tokio::test]
async fn test_audit_log_is_front_office_only() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let engineer = app.caller("ravi", UserRole::ServiceEngineer).await;
    let salesman = app.caller("sunil", UserRole::Salesman).await;
    let audit = &app.services.state.audit_service;

    assert!(audit.list(&reception, AuditQuery::default()).await.is_ok());
    for outsider in [&engineer, &salesman] {
        assert!(matches!(
            audit.list(outsider, AuditQuery::default()).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            audit
                .record_history(outsider, AuditModule::Orders, 1)
                .await,
            Err(ApiError::Forbidden(_))
        ));
    }

    for limit in [0, 501] {
        assert!(matches!(
            audit
                .list(
                    &reception,
                    AuditQuery {
                        limit: Some(limit),
                        ..Default::default()
                    },
                )
                .await,
            Err(ApiError::BadRequest(_))
        ));
    }
}
