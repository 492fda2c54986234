use std::sync::Arc;

use crate::application::services::*;
use crate::config::Config;
use crate::domain::ports::{
    attendance_repository::AttendanceRepository, audit_repository::AuditRepository,
    enquiry_repository::EnquiryRepository, feedback_repository::FeedbackRepository,
    notification_repository::NotificationRepository, order_repository::OrderRepository,
    service_request_repository::ServiceRequestRepository, session_repository::SessionRepository,
    task_queue::TaskQueue, task_spawner::TaskSpawner, time_service::Clock,
    time_service::TimeService, user_repository::UserRepository,
};
use crate::infrastructure::http::middleware::{ApiError, AppState};
use crate::infrastructure::persistence::Database;
use crate::infrastructure::runtime::tokio::{SystemClock, TokioTaskSpawner, TokioTimeService};
use crate::infrastructure::workers::{JobProcessor, JobSchedule, SqliteTaskQueue};
use crate::shared::rate_limiter::LoginRateLimiter;

/// Services wired over one database and one clock. Background work is not
/// started; see [`start_background_jobs`].
pub struct Services {
    pub state: AppState,
    pub sla_monitor: SlaMonitor,
}

pub fn build_services(db: Database, config: &Config, clock: Arc<dyn Clock>) -> Services {
    let user_repo: Arc<dyn UserRepository> = Arc::new(db.clone());
    let session_repo: Arc<dyn SessionRepository> = Arc::new(db.clone());
    let service_request_repo: Arc<dyn ServiceRequestRepository> = Arc::new(db.clone());
    let enquiry_repo: Arc<dyn EnquiryRepository> = Arc::new(db.clone());
    let order_repo: Arc<dyn OrderRepository> = Arc::new(db.clone());
    let attendance_repo: Arc<dyn AttendanceRepository> = Arc::new(db.clone());
    let feedback_repo: Arc<dyn FeedbackRepository> = Arc::new(db.clone());
    let audit_repo: Arc<dyn AuditRepository> = Arc::new(db.clone());
    let notification_repo: Arc<dyn NotificationRepository> = Arc::new(db);

    let notification_service =
        NotificationService::new(notification_repo, user_repo.clone(), clock.clone());
    let audit_service = AuditService::new(audit_repo, clock.clone());

    let auth_service = AuthService::new(
        user_repo.clone(),
        session_repo.clone(),
        LoginRateLimiter::new(),
        config.session_duration_hours,
    );
    let user_service = UserService::new(user_repo.clone(), session_repo, audit_service.clone());

    let service_request_service = ServiceRequestService::new(
        service_request_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
        audit_service.clone(),
        clock.clone(),
        config.frontend_url.clone(),
    );
    let feedback_service = FeedbackService::new(
        feedback_repo,
        service_request_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
        clock.clone(),
    );
    let sla_monitor = SlaMonitor::new(
        service_request_repo,
        user_repo.clone(),
        notification_service.clone(),
        clock.clone(),
    );

    let enquiry_service = EnquiryService::new(
        enquiry_repo,
        user_repo,
        notification_service.clone(),
        audit_service.clone(),
        clock.clone(),
    );
    let attendance_service = AttendanceService::new(
        attendance_repo,
        notification_service.clone(),
        clock.clone(),
        config.business_timezone,
    );
    let order_service = OrderService::new(
        order_repo,
        enquiry_service.clone(),
        attendance_service.clone(),
        notification_service.clone(),
        audit_service.clone(),
        clock,
    );

    Services {
        state: AppState {
            auth_service,
            user_service,
            service_request_service,
            enquiry_service,
            order_service,
            attendance_service,
            notification_service,
            feedback_service,
            audit_service,
        },
        sla_monitor,
    }
}

/// Seeds the recurring jobs and spawns the worker loop.
pub async fn start_background_jobs(
    db: Database,
    config: &Config,
    services: &Services,
    clock: Arc<dyn Clock>,
) -> Result<(), ApiError> {
    let task_spawner: Arc<dyn TaskSpawner> = Arc::new(TokioTaskSpawner::new());
    let time_service: Arc<dyn TimeService> = Arc::new(TokioTimeService::new());
    let queue: Arc<dyn TaskQueue> = Arc::new(SqliteTaskQueue::new(db));

    let job_processor = JobProcessor::new(
        queue,
        services.state.auth_service.clone(),
        services.state.notification_service.clone(),
        services.sla_monitor.clone(),
        JobSchedule::with_sla_interval_minutes(config.sla_check_interval_minutes),
        clock,
        time_service,
    );

    job_processor.schedule_recurring_jobs().await?;

    task_spawner.spawn(Box::pin(async move {
        job_processor.run().await;
    }));
    tracing::info!(
        "Background jobs started (SLA check every {} minutes)",
        config.sla_check_interval_minutes
    );

    Ok(())
}

pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let services = build_services(db.clone(), config, clock.clone());

    start_background_jobs(db, config, &services, clock).await?;

    Ok(services.state)
}

pub async fn initialize_admin(state: &AppState, config: &Config) -> Result<(), ApiError> {
    tracing::info!("Checking for admin user initialization");

    if state
        .auth_service
        .ensure_admin(&config.admin_username, &config.admin_password)
        .await?
    {
        tracing::info!("Admin user created: {}", config.admin_username);
    } else {
        tracing::info!("Admin user already exists: {}", config.admin_username);
    }

    Ok(())
}
