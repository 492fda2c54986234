use crate::infrastructure::http::controllers as api;
use crate::infrastructure::http::middleware::{require_auth, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    // Build protected routes (require authentication)
    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/session", get(api::auth::get_session))
        // Users
        .route(
            "/api/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route("/api/users/:id", get(api::users::get_user))
        .route(
            "/api/users/:id/deactivate",
            post(api::users::deactivate_user),
        )
        // Service requests
        .route(
            "/api/service-requests",
            get(api::service_requests::list_service_requests)
                .post(api::service_requests::create_service_request),
        )
        .route(
            "/api/service-requests/my",
            get(api::service_requests::my_service_requests),
        )
        .route(
            "/api/service-requests/:id",
            get(api::service_requests::get_service_request),
        )
        .route(
            "/api/service-requests/:id/assign",
            put(api::service_requests::assign_service_request),
        )
        .route(
            "/api/service-requests/:id/status",
            put(api::service_requests::update_service_request_status),
        )
        .route(
            "/api/service-requests/engineers/:id/sla-stats",
            get(api::service_requests::engineer_sla_stats),
        )
        // Enquiries
        .route(
            "/api/enquiries",
            get(api::enquiries::list_enquiries).post(api::enquiries::create_enquiry),
        )
        .route(
            "/api/enquiries/:id",
            get(api::enquiries::get_enquiry)
                .put(api::enquiries::update_enquiry)
                .delete(api::enquiries::delete_enquiry),
        )
        // Orders
        .route(
            "/api/orders",
            get(api::orders::list_orders).post(api::orders::create_order),
        )
        .route("/api/orders/:id", get(api::orders::get_order))
        .route("/api/orders/:id/approve", put(api::orders::approve_order))
        .route("/api/orders/:id/reject", put(api::orders::reject_order))
        // Attendance
        .route("/api/attendance/check-in", post(api::attendance::check_in))
        .route("/api/attendance/today", get(api::attendance::today))
        .route("/api/attendance/my-history", get(api::attendance::my_history))
        .route("/api/attendance/all/today", get(api::attendance::all_today))
        .route(
            "/api/attendance/employee/:id",
            get(api::attendance::employee_history),
        )
        // Notifications
        .route(
            "/api/notifications",
            get(api::notifications::list_notifications),
        )
        .route(
            "/api/notifications/unread-count",
            get(api::notifications::get_unread_count),
        )
        .route(
            "/api/notifications/read-all",
            put(api::notifications::mark_all_as_read),
        )
        .route(
            "/api/notifications/:id/read",
            put(api::notifications::mark_as_read),
        )
        // Feedback
        .route("/api/feedback/my", get(api::feedback::my_feedback))
        .route(
            "/api/feedback/analytics",
            get(api::feedback::engineer_analytics),
        )
        .route(
            "/api/feedback/analytics/engineers",
            get(api::feedback::all_engineer_analytics),
        )
        .route("/api/feedback/negative", get(api::feedback::negative_feedback))
        // Audit trail
        .route("/api/audit/logs", get(api::audit::list_audit_logs))
        .route(
            "/api/audit/logs/:module/:record_id",
            get(api::audit::record_history),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    // Build public routes
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(api::auth::login))
        .route(
            "/api/public/service-requests",
            post(api::public::create_service_request),
        )
        .route(
            "/api/public/service-requests/track/:identifier",
            get(api::public::track_service_request),
        )
        .route("/api/public/enquiries", post(api::public::create_enquiry))
        .route("/api/public/feedback", post(api::public::submit_feedback))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Printdesk back office"
}

async fn health_handler() -> &'static str {
    "OK"
}
