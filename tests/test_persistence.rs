mod helpers;

use chrono::NaiveDate;
use helpers::*;
use printdesk::domain::entities::{
    AttendanceStatus, EnquiryPriority, NewAttendance, NewEnquiry, NewServiceRequest, NewUser,
    Priority, UserRole,
};
use printdesk::domain::ports::{
    AttendanceRepository, EnquiryRepository, ServiceRequestRepository, UserRepository,
};

#[tokio::test]
async fn test_created_rows_are_visible_from_other_connections() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let mut ids = Vec::new();
    for i in 0..12 {
        let user = db
            .create_user(&NewUser {
                username: format!("staff{}", i),
                email: (i % 2 == 0).then(|| format!("staff{}@printdesk.test", i)),
                full_name: format!("Staff {}", i),
                role: UserRole::Reception,
                password_hash: "test_hash".to_string(),
            })
            .await
            .unwrap();
        ids.push(user.id);
    }

    // Reads go through whichever pooled connection is free
    let reads = futures::future::join_all(ids.iter().map(|id| db.get_user_by_id(*id))).await;
    for (i, read) in reads.into_iter().enumerate() {
        let user = read.unwrap().expect("user visible after insert");
        assert_eq!(user.id, ids[i]);
        assert_eq!(user.username, format!("staff{}", i));
        if i % 2 == 0 {
            assert_eq!(user.email, Some(format!("staff{}@printdesk.test", i)));
        } else {
            assert_eq!(user.email, None);
        }
    }

    assert_eq!(db.list_users(Some(UserRole::Reception)).await.unwrap().len(), 12);
}

#[tokio::test]
async fn test_ticket_without_optional_fields_reads_back() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let created = db
        .create_service_request(&NewServiceRequest {
            ticket_no: "SR20260504AAAAAA".to_string(),
            customer_name: "Walk-in".to_string(),
            phone: None,
            email: None,
            company: None,
            address: None,
            machine_model: None,
            fault_description: None,
            priority: Priority::Normal,
            assigned_to: None,
            created_at: business_morning(),
        })
        .await
        .unwrap();

    let stored = db
        .get_service_request_by_ticket_no("SR20260504AAAAAA")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.phone, None);
    assert_eq!(stored.assigned_to, None);
    assert_eq!(stored.resolution_notes, None);
    assert_eq!(stored.completed_at, None);
    assert_eq!(stored.created_at, business_morning());

    assert_eq!(db.list_open_service_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_enquiry_and_attendance_without_optional_fields_read_back() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;
    let salesman = create_test_user(db, "sunil", UserRole::Salesman).await;

    let enquiry = db
        .create_enquiry(&NewEnquiry {
            enquiry_no: "ENQ-0001".to_string(),
            customer_name: "Gupta Stationers".to_string(),
            phone: None,
            email: None,
            product_interest: None,
            priority: EnquiryPriority::Warm,
            source: "walk-in".to_string(),
            assigned_to: None,
            next_follow_up: None,
            notes: None,
            created_by: salesman.username.clone(),
        })
        .await
        .unwrap();
    let stored = db.get_enquiry(enquiry.id).await.unwrap().unwrap();
    assert_eq!(stored.customer_name, "Gupta Stationers");
    assert_eq!(stored.assigned_to, None);
    assert_eq!(stored.next_follow_up, None);

    let day = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
    db.create_attendance(&NewAttendance {
        user_id: salesman.id,
        attendance_date: day,
        check_in_at: business_morning(),
        status: AttendanceStatus::OnTime,
        location: None,
        latitude: None,
        longitude: None,
        photo_url: "https://cdn.test/selfie.jpg".to_string(),
    })
    .await
    .unwrap();
    let marked = db
        .get_attendance_for_date(salesman.id, day)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(marked.location, None);
    assert_eq!(marked.latitude, None);
    assert_eq!(marked.status, AttendanceStatus::OnTime);
}
