use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::entities::{
    NotificationDraft, NotificationPriority, NotificationType, ServiceRequest, UserRole,
};
use crate::domain::ports::{
    service_request_repository::ServiceRequestRepository, time_service::Clock,
    user_repository::UserRepository,
};
use crate::domain::services::{format_sla_duration, SlaResult};
use crate::infrastructure::http::middleware::error::ApiResult;

use super::notification_service::NotificationService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlaCheckSummary {
    pub checked: usize,
    pub warnings_sent: usize,
    pub breaches_sent: usize,
}

/// Periodic sweep over open tickets that escalates SLA warnings and breaches
/// exactly once per ticket.
#[derive(Clone)]
pub struct SlaMonitor {
    repo: Arc<dyn ServiceRequestRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl SlaMonitor {
    pub fn new(
        repo: Arc<dyn ServiceRequestRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            user_repo,
            notifications,
            clock,
        }
    }

    pub async fn check_sla_escalations(&self) -> ApiResult<SlaCheckSummary> {
        let now = self.clock.now();
        let open = self.repo.list_open_service_requests().await?;
        let mut summary = SlaCheckSummary {
            checked: open.len(),
            ..Default::default()
        };

        for request in &open {
            let outcome = match request.sla(now) {
                SlaResult::Breached(overdue) if !request.sla_breach_sent => {
                    self.escalate_breach(request, overdue).await.map(|_| {
                        summary.breaches_sent += 1;
                    })
                }
                SlaResult::Warning(remaining) if !request.sla_warning_sent => {
                    self.escalate_warning(request, remaining).await.map(|_| {
                        summary.warnings_sent += 1;
                    })
                }
                _ => Ok(()),
            };

            if let Err(e) = outcome {
                error!("SLA escalation failed for {}: {}", request.ticket_no, e);
            }
        }

        metrics::counter!("printdesk_sla_warnings_total").increment(summary.warnings_sent as u64);
        metrics::counter!("printdesk_sla_breaches_total").increment(summary.breaches_sent as u64);

        info!(
            "SLA check complete: {} checked, {} warnings, {} breaches",
            summary.checked, summary.warnings_sent, summary.breaches_sent
        );
        Ok(summary)
    }

    async fn engineer_name(&self, request: &ServiceRequest) -> String {
        let Some(engineer_id) = request.assigned_to else {
            return "Unassigned".to_string();
        };
        match self.user_repo.get_user_by_id(engineer_id).await {
            Ok(Some(user)) => user.full_name,
            _ => format!("user {}", engineer_id),
        }
    }

    async fn escalate_warning(
        &self,
        request: &ServiceRequest,
        remaining: chrono::Duration,
    ) -> ApiResult<()> {
        // Flagged before fan-out, so delivery failures never repeat a warning
        self.repo.mark_sla_warning_sent(request.id).await?;

        let title = format!("SLA Warning - Ticket #{}", request.ticket_no);
        let left = format_sla_duration(remaining);

        if let Some(engineer_id) = request.assigned_to {
            let draft = NotificationDraft::new(
                NotificationType::SlaWarning,
                title.clone(),
                format!(
                    "Only {} left to complete service. Customer: {}",
                    left, request.customer_name
                ),
            )
            .with_priority(NotificationPriority::High)
            .with_action_url("/service-engineer/jobs");
            self.notifications.notify_users([engineer_id], &draft).await;
        }

        let draft = NotificationDraft::new(
            NotificationType::SlaWarning,
            title,
            format!(
                "Service request nearing SLA breach. Engineer: {}. {} remaining.",
                self.engineer_name(request).await,
                left
            ),
        )
        .with_priority(NotificationPriority::High)
        .with_action_url(format!("/admin/service-requests/{}", request.id));
        self.notifications
            .notify_roles(&[UserRole::Admin], None, &draft)
            .await;

        Ok(())
    }

    async fn escalate_breach(
        &self,
        request: &ServiceRequest,
        overdue: chrono::Duration,
    ) -> ApiResult<()> {
        self.repo.mark_sla_breach_sent(request.id).await?;

        let title = format!("SLA BREACHED - Ticket #{}", request.ticket_no);
        let late = format_sla_duration(overdue);

        if let Some(engineer_id) = request.assigned_to {
            let draft = NotificationDraft::new(
                NotificationType::SlaBreach,
                title.clone(),
                format!(
                    "Service request is {} overdue. Customer: {}. Take immediate action.",
                    late, request.customer_name
                ),
            )
            .with_priority(NotificationPriority::Critical)
            .with_action_url("/service-engineer/jobs");
            self.notifications.notify_users([engineer_id], &draft).await;
        }

        let reception = NotificationDraft::new(
            NotificationType::SlaBreach,
            title.clone(),
            format!(
                "Service request overdue by {}. Customer: {}, Phone: {}",
                late,
                request.customer_name,
                request.phone.as_deref().unwrap_or("-")
            ),
        )
        .with_priority(NotificationPriority::Critical)
        .with_action_url("/reception/service-complaints");
        self.notifications
            .notify_roles(&[UserRole::Reception], None, &reception)
            .await;

        let admin = NotificationDraft::new(
            NotificationType::SlaBreach,
            title,
            format!(
                "Service overdue by {}. Engineer: {}. Priority: {}",
                late,
                self.engineer_name(request).await,
                request.priority
            ),
        )
        .with_priority(NotificationPriority::Critical)
        .with_action_url(format!("/admin/service-requests/{}", request.id));
        self.notifications
            .notify_roles(&[UserRole::Admin], None, &admin)
            .await;

        Ok(())
    }
}
