use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::entities::{
    generate_ticket_no, AuditAction, AuditModule, NewServiceRequest, NotificationDraft, NotificationPriority,
    NotificationType, Priority, ServiceRequest, ServiceRequestFilter, TicketStatus, UserRole,
};
use crate::domain::ports::{
    service_request_repository::ServiceRequestRepository, time_service::Clock,
    user_repository::UserRepository,
};
use crate::domain::services::{
    allowed_next, format_sla_duration, is_terminal, sla_due_at, validate_transition, Capability,
    SlaKind, SlaResult,
};
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};
use crate::shared::utils::{
    normalize_optional_email, normalize_optional_phone, normalize_phone, require_non_empty,
    to_rfc3339, trim_optional,
};

use super::audit_service::AuditService;
use super::notification_service::NotificationService;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateServiceRequest {
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub machine_model: Option<String>,
    pub fault_description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub assigned_to: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: TicketStatus,
    pub resolution_notes: Option<String>,
    pub parts_replaced: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceRequestQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub engineer_id: Option<i64>,
    pub sla: Option<SlaKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Derived SLA state attached to every ticket response.
#[derive(Debug, Clone, Serialize)]
pub struct SlaView {
    pub kind: SlaKind,
    /// Seconds remaining, or seconds overdue when breached.
    pub seconds: Option<i64>,
    pub display: Option<String>,
    pub due_at: String,
    pub allowed_next_statuses: Vec<TicketStatus>,
}

impl SlaView {
    pub fn for_request(request: &ServiceRequest, now: DateTime<Utc>) -> Self {
        let result = request.sla(now);
        Self {
            kind: result.kind(),
            seconds: result.duration().map(|d| d.num_seconds()),
            display: result.duration().map(format_sla_duration),
            due_at: to_rfc3339(sla_due_at(request.priority, request.created_at)),
            allowed_next_statuses: allowed_next(request.status).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequestView {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub sla: SlaView,
}

#[derive(Debug, Serialize)]
pub struct ServiceRequestPage {
    pub service_requests: Vec<ServiceRequestView>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineerSlaStats {
    pub engineer_id: i64,
    pub total_jobs: i64,
    pub sla_compliant: i64,
    pub sla_warnings: i64,
    pub sla_breached: i64,
    pub compliance_percentage: f64,
}

/// Tally SLA outcomes for a set of tickets at `now`. Completed tickets are
/// judged by their completion stamp, open ones by the evaluator. Every
/// ticket that has not breached counts as compliant, warnings included.
pub fn compute_sla_stats(
    engineer_id: i64,
    requests: &[ServiceRequest],
    now: DateTime<Utc>,
) -> EngineerSlaStats {
    let mut warnings = 0;
    let mut breached = 0;

    for request in requests {
        match request.sla(now) {
            SlaResult::Completed => {
                let due = sla_due_at(request.priority, request.created_at);
                if request.completed_at.map_or(false, |done| done > due) {
                    breached += 1;
                }
            }
            SlaResult::Breached(_) => breached += 1,
            SlaResult::Warning(_) => warnings += 1,
            SlaResult::Ok(_) => {}
        }
    }

    let total = requests.len() as i64;
    let compliant = total - breached;
    let compliance_percentage = if total > 0 {
        (compliant as f64 / total as f64 * 10000.0).round() / 100.0
    } else {
        100.0
    };

    EngineerSlaStats {
        engineer_id,
        total_jobs: total,
        sla_compliant: compliant,
        sla_warnings: warnings,
        sla_breached: breached,
        compliance_percentage,
    }
}

fn validate_page(limit: Option<i64>, offset: Option<i64>) -> ApiResult<(i64, i64)> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::BadRequest("offset must not be negative".to_string()));
    }
    Ok((limit, offset))
}

#[derive(Clone)]
pub struct ServiceRequestService {
    repo: Arc<dyn ServiceRequestRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifications: NotificationService,
    audit: AuditService,
    clock: Arc<dyn Clock>,
    frontend_url: String,
}

impl ServiceRequestService {
    pub fn new(
        repo: Arc<dyn ServiceRequestRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifications: NotificationService,
        audit: AuditService,
        clock: Arc<dyn Clock>,
        frontend_url: String,
    ) -> Self {
        Self {
            repo,
            user_repo,
            notifications,
            audit,
            clock,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn view(&self, request: ServiceRequest) -> ServiceRequestView {
        let sla = SlaView::for_request(&request, self.clock.now());
        ServiceRequestView { request, sla }
    }

    async fn require_engineer(&self, engineer_id: i64) -> ApiResult<()> {
        let engineer = self
            .user_repo
            .get_user_by_id(engineer_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Engineer {} not found", engineer_id)))?;

        if engineer.role != UserRole::ServiceEngineer || !engineer.is_active {
            return Err(ApiError::BadRequest(format!(
                "User {} is not an active service engineer",
                engineer_id
            )));
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> ApiResult<ServiceRequest> {
        self.repo
            .get_service_request(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Service request {} not found", id)))
    }

    fn build_new(&self, request: CreateServiceRequest) -> ApiResult<NewServiceRequest> {
        let now = self.clock.now();
        Ok(NewServiceRequest {
            ticket_no: generate_ticket_no(now),
            customer_name: require_non_empty("Customer name", &request.customer_name)?,
            phone: normalize_optional_phone(request.phone)?,
            email: normalize_optional_email(request.email)?,
            company: trim_optional(request.company),
            address: trim_optional(request.address),
            machine_model: trim_optional(request.machine_model),
            fault_description: trim_optional(request.fault_description),
            priority: request.priority,
            assigned_to: request.assigned_to,
            created_at: now,
        })
    }

    async fn notify_assigned(&self, request: &ServiceRequest, engineer_id: i64) {
        let draft = NotificationDraft::new(
            NotificationType::ServiceAssigned,
            format!("New job assigned - Ticket #{}", request.ticket_no),
            format!(
                "{} ({} priority). Machine: {}",
                request.customer_name,
                request.priority,
                request.machine_model.as_deref().unwrap_or("not specified")
            ),
        )
        .with_priority(if request.priority == Priority::Critical {
            NotificationPriority::High
        } else {
            NotificationPriority::Normal
        })
        .with_action_url("/service-engineer/jobs");

        self.notifications.notify_users([engineer_id], &draft).await;
    }

    /// Staff intake. The ticket starts ASSIGNED, with or without an engineer.
    pub async fn create(
        &self,
        auth_user: &AuthenticatedUser,
        request: CreateServiceRequest,
    ) -> ApiResult<ServiceRequestView> {
        auth_user.require(Capability::ServiceRequestsCreate)?;

        if let Some(engineer_id) = request.assigned_to {
            self.require_engineer(engineer_id).await?;
        }

        let new_request = self.build_new(request)?;
        let created = self.repo.create_service_request(&new_request).await?;

        info!(
            "User {} created service request {}",
            auth_user.user.username, created.ticket_no
        );
        self.audit
            .record(
                auth_user,
                AuditAction::Create,
                AuditModule::ServiceRequests,
                created.id,
                Some(json!({ "ticket_no": created.ticket_no, "assigned_to": created.assigned_to })),
            )
            .await;

        if let Some(engineer_id) = created.assigned_to {
            self.notify_assigned(&created, engineer_id).await;
        }

        Ok(self.view(created))
    }

    /// Walk-in or website intake. No engineer is attached and the front desk
    /// is told about the ticket.
    pub async fn create_public(&self, request: CreateServiceRequest) -> ApiResult<ServiceRequestView> {
        if request.phone.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(ApiError::BadRequest("Phone is required".to_string()));
        }

        let new_request = self.build_new(CreateServiceRequest {
            assigned_to: None,
            ..request
        })?;
        let created = self.repo.create_service_request(&new_request).await?;

        info!("Public service request {} received", created.ticket_no);

        let draft = NotificationDraft::new(
            NotificationType::ServiceNew,
            format!("New service request - Ticket #{}", created.ticket_no),
            format!(
                "{} reported: {}",
                created.customer_name,
                created.fault_description.as_deref().unwrap_or("no description")
            ),
        )
        .with_priority(NotificationPriority::High)
        .with_action_url(format!("/reception/service-complaints/{}", created.id));
        self.notifications
            .notify_roles(&[UserRole::Reception, UserRole::Admin], None, &draft)
            .await;

        Ok(self.view(created))
    }

    /// Look up by ticket number first, then by phone (newest first).
    pub async fn track(&self, identifier: &str) -> ApiResult<Vec<ServiceRequestView>> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ApiError::BadRequest("Ticket number or phone is required".to_string()));
        }

        if let Some(request) = self
            .repo
            .get_service_request_by_ticket_no(&identifier.to_uppercase())
            .await?
        {
            return Ok(vec![self.view(request)]);
        }

        let phone = normalize_phone(identifier).map_err(|_| {
            ApiError::NotFound("No service request matches that ticket number".to_string())
        })?;
        let requests = self.repo.list_service_requests_by_phone(&phone).await?;
        if requests.is_empty() {
            return Err(ApiError::NotFound(
                "No service requests found for that phone number".to_string(),
            ));
        }

        Ok(requests.into_iter().map(|r| self.view(r)).collect())
    }

    pub async fn assign(
        &self,
        auth_user: &AuthenticatedUser,
        id: i64,
        engineer_id: i64,
    ) -> ApiResult<ServiceRequestView> {
        auth_user.require(Capability::ServiceRequestsAssign)?;

        let mut request = self.load(id).await?;
        if is_terminal(request.status) {
            return Err(ApiError::BadRequest(format!(
                "Service request {} is {} and cannot be reassigned",
                request.ticket_no, request.status
            )));
        }
        self.require_engineer(engineer_id).await?;

        let now = self.clock.now();
        self.repo.assign_service_request(id, engineer_id, now).await?;

        let previous = request.assigned_to.replace(engineer_id);
        request.updated_at = now;

        info!(
            "User {} assigned {} to engineer {} (was {:?})",
            auth_user.user.username, request.ticket_no, engineer_id, previous
        );
        self.audit
            .record(
                auth_user,
                AuditAction::Assign,
                AuditModule::ServiceRequests,
                request.id,
                Some(json!({ "from": previous, "to": engineer_id })),
            )
            .await;

        if previous != Some(engineer_id) {
            self.notify_assigned(&request, engineer_id).await;
        }

        Ok(self.view(request))
    }

    pub async fn list(
        &self,
        auth_user: &AuthenticatedUser,
        query: ServiceRequestQuery,
    ) -> ApiResult<ServiceRequestPage> {
        auth_user.require(Capability::ServiceRequestsViewAll)?;

        let (limit, offset) = validate_page(query.limit, query.offset)?;
        let mut filter = ServiceRequestFilter {
            status: query.status,
            priority: query.priority,
            assigned_to: query.engineer_id,
            limit: Some(limit),
            offset,
        };

        let service_requests = match query.sla {
            None => self
                .repo
                .list_service_requests(&filter)
                .await?
                .into_iter()
                .map(|r| self.view(r))
                .collect(),
            // SLA kind is derived, so page after classifying every match
            Some(kind) => {
                filter.limit = None;
                filter.offset = 0;
                self.repo
                    .list_service_requests(&filter)
                    .await?
                    .into_iter()
                    .map(|r| self.view(r))
                    .filter(|v| v.sla.kind == kind)
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect()
            }
        };

        Ok(ServiceRequestPage {
            service_requests,
            limit,
            offset,
        })
    }

    /// Engineers see their own queue. Admins may look at any engineer's.
    pub async fn my_tickets(
        &self,
        auth_user: &AuthenticatedUser,
        engineer_id: Option<i64>,
        status: Option<TicketStatus>,
    ) -> ApiResult<Vec<ServiceRequestView>> {
        let engineer_id = match (auth_user.role(), engineer_id) {
            (UserRole::ServiceEngineer, None) => auth_user.id(),
            (UserRole::ServiceEngineer, Some(id)) if id == auth_user.id() => id,
            (UserRole::Admin, Some(id)) => id,
            (UserRole::Admin, None) => {
                return Err(ApiError::BadRequest("engineer_id is required".to_string()))
            }
            _ => {
                return Err(ApiError::Forbidden(
                    "Only service engineers have a ticket queue".to_string(),
                ))
            }
        };

        let filter = ServiceRequestFilter {
            status,
            assigned_to: Some(engineer_id),
            ..Default::default()
        };
        let mut views: Vec<ServiceRequestView> = self
            .repo
            .list_service_requests(&filter)
            .await?
            .into_iter()
            .map(|r| self.view(r))
            .collect();

        // Most urgent first, then oldest first
        views.sort_by(|a, b| {
            let rank = |v: &ServiceRequestView| v.request.sla(self.clock.now()).severity();
            rank(b)
                .cmp(&rank(a))
                .then(a.request.created_at.cmp(&b.request.created_at))
        });

        Ok(views)
    }

    pub async fn get(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<ServiceRequestView> {
        let request = self.load(id).await?;

        if !auth_user.can(Capability::ServiceRequestsViewAll) {
            if !(auth_user.can(Capability::ServiceRequestsWork) && request.is_assigned_to(auth_user.id()))
            {
                return Err(ApiError::Forbidden(
                    "You can only view tickets assigned to you".to_string(),
                ));
            }
        }

        Ok(self.view(request))
    }

    pub async fn update_status(
        &self,
        auth_user: &AuthenticatedUser,
        id: i64,
        update: StatusUpdateRequest,
    ) -> ApiResult<ServiceRequestView> {
        auth_user.require(Capability::ServiceRequestsWork)?;

        let mut request = self.load(id).await?;
        if !request.is_assigned_to(auth_user.id()) {
            return Err(ApiError::Forbidden(
                "You can only update tickets assigned to you".to_string(),
            ));
        }

        validate_transition(request.status, update.status)?;

        let now = self.clock.now();
        let previous = request.status;
        request.status = update.status;
        request.updated_at = now;
        if let Some(parts) = trim_optional(update.parts_replaced) {
            request.parts_replaced = Some(parts);
        }

        if update.status == TicketStatus::Completed {
            let notes = trim_optional(update.resolution_notes).ok_or_else(|| {
                ApiError::BadRequest("Resolution notes are required to complete a ticket".to_string())
            })?;
            request.resolution_notes = Some(notes);
            request.completed_at = Some(now);
            request.feedback_url = Some(format!("{}/feedback/{}", self.frontend_url, request.id));
        } else if let Some(notes) = trim_optional(update.resolution_notes) {
            request.resolution_notes = Some(notes);
        }

        if !self.repo.update_service_request_status(&request, previous).await? {
            return Err(ApiError::Conflict(format!(
                "Service request {} was updated by someone else",
                request.ticket_no
            )));
        }

        info!(
            "Engineer {} moved {} from {} to {}",
            auth_user.user.username, request.ticket_no, previous, request.status
        );
        self.audit
            .record(
                auth_user,
                AuditAction::StatusChange,
                AuditModule::ServiceRequests,
                request.id,
                Some(json!({ "from": previous, "to": request.status })),
            )
            .await;

        if request.status == TicketStatus::Completed {
            self.notify_completed(&request, auth_user).await;
        }

        Ok(self.view(request))
    }

    async fn notify_completed(&self, request: &ServiceRequest, engineer: &AuthenticatedUser) {
        let completed = NotificationDraft::new(
            NotificationType::ServiceCompleted,
            format!("Service completed - Ticket #{}", request.ticket_no),
            format!(
                "{} completed the job for {}",
                engineer.user.full_name, request.customer_name
            ),
        )
        .with_action_url(format!("/admin/service-requests/{}", request.id));
        self.notifications
            .notify_roles(&[UserRole::Admin, UserRole::Reception], None, &completed)
            .await;

        let due = sla_due_at(request.priority, request.created_at);
        let Some(done) = request.completed_at.filter(|done| *done > due) else {
            return;
        };

        let late = NotificationDraft::new(
            NotificationType::SlaBreach,
            format!("Completed after SLA - Ticket #{}", request.ticket_no),
            format!(
                "Ticket finished {} past its {} deadline. Engineer: {}",
                format_sla_duration(done - due),
                request.priority,
                engineer.user.full_name
            ),
        )
        .with_priority(NotificationPriority::High)
        .with_action_url(format!("/admin/service-requests/{}", request.id));
        self.notifications
            .notify_roles(&[UserRole::Admin], None, &late)
            .await;
    }

    /// SLA outcome counts for one engineer's tickets created in the range.
    pub async fn engineer_stats(
        &self,
        auth_user: &AuthenticatedUser,
        engineer_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ApiResult<EngineerSlaStats> {
        if auth_user.id() != engineer_id {
            auth_user.require(Capability::ReportsView)?;
        }
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ApiError::BadRequest("from must not be after to".to_string()));
            }
        }

        let requests = self
            .repo
            .list_engineer_service_requests(engineer_id, from, to)
            .await?;
        Ok(compute_sla_stats(engineer_id, &requests, self.clock.now()))
    }
}
