mod helpers;

use chrono::{Duration, TimeZone, Utc};
use helpers::*;
use printdesk::application::services::CheckInRequest;
use printdesk::domain::entities::{AttendanceStatus, UserRole};
use printdesk::infrastructure::http::middleware::ApiError;

fn selfie() -> CheckInRequest {
    CheckInRequest {
        photo_url: "https://cdn.test/selfie.jpg".to_string(),
        location: Some("Karol Bagh office".to_string()),
        latitude: Some(28.6519),
        longitude: Some(77.1909),
    }
}

#[tokio::test]
async fn test_one_check_in_per_business_day() {
    let app = TestApp::new().await;
    let admin = app.user("boss", UserRole::Admin).await;
    let salesman = app.caller("sunil", UserRole::Salesman).await;
    let attendance = &app.services.state.attendance_service;

    let before = attendance.today(&salesman).await.unwrap();
    assert!(!before.checked_in);

    let record = attendance.check_in(&salesman, selfie()).await.unwrap();
    assert_eq!(record.attendance_date, "2026-05-04");
    assert_eq!(record.status, AttendanceStatus::OnTime);
    assert_eq!(record.location.as_deref(), Some("Karol Bagh office"));

    let after = attendance.today(&salesman).await.unwrap();
    assert!(after.checked_in);
    assert_eq!(after.attendance.map(|a| a.id), Some(record.id));

    app.clock.advance(Duration::hours(2));
    match attendance.check_in(&salesman, selfie()).await {
        Err(ApiError::Conflict(message)) => assert_eq!(message, "Already checked in today"),
        other => panic!("expected Conflict, got {:?}", other.map(|a| a.id)),
    }

    // Punctual check-ins do not bother the admin
    assert!(app.notification_types(admin.id).await.is_empty());

    app.clock.advance(Duration::days(1));
    attendance.check_in(&salesman, selfie()).await.unwrap();

    let history = attendance.my_history(&salesman, None).await.unwrap();
    let dates: Vec<&str> = history.iter().map(|a| a.attendance_date.as_str()).collect();
    assert_eq!(dates, vec!["2026-05-05", "2026-05-04"]);
}

#[tokio::test]
async fn test_late_check_in_alerts_admin() {
    // 09:45 in Kolkata
    let app = TestApp::starting_at(Utc.with_ymd_and_hms(2026, 5, 4, 4, 15, 0).unwrap()).await;
    let admin = app.user("boss", UserRole::Admin).await;
    let engineer = app.caller("ravi", UserRole::ServiceEngineer).await;

    let record = app
        .services
        .state
        .attendance_service
        .check_in(&engineer, selfie())
        .await
        .unwrap();

    assert_eq!(record.status, AttendanceStatus::Late);
    assert_eq!(app.notification_types(admin.id).await, vec!["late_attendance"]);

    let page = app
        .services
        .state
        .notification_service
        .list_notifications(admin.id, true, None, None)
        .await
        .unwrap();
    assert!(page.notifications[0].message.contains("09:45 AM"));
}

#[tokio::test]
async fn test_business_day_follows_local_midnight() {
    // 23:30 UTC is already 05:00 the next morning in Kolkata
    let app = TestApp::starting_at(Utc.with_ymd_and_hms(2026, 5, 4, 23, 30, 0).unwrap()).await;
    let salesman = app.caller("sunil", UserRole::Salesman).await;

    let record = app
        .services
        .state
        .attendance_service
        .check_in(&salesman, selfie())
        .await
        .unwrap();

    assert_eq!(record.attendance_date, "2026-05-05");
    assert_eq!(record.status, AttendanceStatus::OnTime);
}

#[tokio::test]
async fn test_check_in_validation() {
    let app = TestApp::new().await;
    let salesman = app.caller("sunil", UserRole::Salesman).await;
    let attendance = &app.services.state.attendance_service;

    let no_photo = CheckInRequest {
        photo_url: "   ".to_string(),
        ..selfie()
    };
    assert!(matches!(
        attendance.check_in(&salesman, no_photo).await,
        Err(ApiError::BadRequest(_))
    ));

    let off_the_map = CheckInRequest {
        latitude: Some(123.0),
        ..selfie()
    };
    assert!(matches!(
        attendance.check_in(&salesman, off_the_map).await,
        Err(ApiError::BadRequest(_))
    ));

    // Failed attempts leave the day open
    assert!(!attendance.today(&salesman).await.unwrap().checked_in);
}

#[tokio::test]
async fn test_office_views_everyone_staff_view_themselves() {
    let app = TestApp::new().await;
    let reception = app.caller("frontdesk", UserRole::Reception).await;
    let salesman_user = app.user("sunil", UserRole::Salesman).await;
    let salesman = as_caller(&salesman_user);
    let engineer = app.caller("ravi", UserRole::ServiceEngineer).await;
    let attendance = &app.services.state.attendance_service;

    attendance.check_in(&salesman, selfie()).await.unwrap();
    attendance.check_in(&engineer, selfie()).await.unwrap();

    assert_eq!(attendance.all_today(&reception).await.unwrap().len(), 2);
    assert!(matches!(
        attendance.all_today(&salesman).await,
        Err(ApiError::Forbidden(_))
    ));

    assert_eq!(
        attendance
            .employee_history(&reception, salesman_user.id, Some(7))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(
        attendance
            .employee_history(&engineer, salesman_user.id, None)
            .await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(attendance
        .employee_history(&salesman, salesman_user.id, None)
        .await
        .is_ok());
    assert!(matches!(
        attendance.my_history(&salesman, Some(0)).await,
        Err(ApiError::BadRequest(_))
    ));
}
