use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{
    is_negative_rating, performance_score, round2, EngineerFeedback, Feedback, NewFeedback,
    NotificationDraft, NotificationPriority, NotificationType, ServiceRequest,
    ServiceRequestFilter, TicketStatus, User, UserRole, MAX_RATING, MIN_RATING,
};
use crate::domain::ports::{
    feedback_repository::FeedbackRepository,
    service_request_repository::ServiceRequestRepository, time_service::Clock,
    user_repository::UserRepository,
};
use crate::domain::services::{sla_due_at, Capability};
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};
use crate::shared::utils::{to_rfc3339, trim_optional};

use super::notification_service::NotificationService;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub service_request_id: i64,
    #[serde(default)]
    pub customer_name: String,
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineerAnalytics {
    pub engineer_id: i64,
    pub engineer_name: String,
    pub total_jobs_completed: i64,
    pub feedback_count: i64,
    pub average_rating: f64,
    pub negative_count: i64,
    pub negative_percentage: f64,
    pub sla_compliance_percentage: f64,
    pub performance_score: f64,
}

/// Scores an engineer from their completed tickets and the feedback left on
/// them. SLA compliance counts completions stamped at or before the due time.
/// Without any feedback there is nothing to blend, so the score stays 0.
pub fn compute_engineer_analytics(
    engineer: &User,
    completed: &[ServiceRequest],
    feedback: &[Feedback],
) -> EngineerAnalytics {
    let stamped: Vec<&ServiceRequest> = completed
        .iter()
        .filter(|r| r.completed_at.is_some())
        .collect();
    let on_time = stamped
        .iter()
        .filter(|r| {
            r.completed_at
                .map_or(false, |done| done <= sla_due_at(r.priority, r.created_at))
        })
        .count();
    let sla_compliance_percentage = if stamped.is_empty() {
        0.0
    } else {
        round2(on_time as f64 / stamped.len() as f64 * 100.0)
    };

    let feedback_count = feedback.len() as i64;
    let negative_count = feedback.iter().filter(|f| f.is_negative).count() as i64;
    let (average_rating, negative_percentage, score) = if feedback_count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let total: i64 = feedback.iter().map(|f| f.rating).sum();
        let average = round2(total as f64 / feedback_count as f64);
        (
            average,
            round2(negative_count as f64 / feedback_count as f64 * 100.0),
            performance_score(average, sla_compliance_percentage),
        )
    };

    EngineerAnalytics {
        engineer_id: engineer.id,
        engineer_name: engineer.full_name.clone(),
        total_jobs_completed: completed.len() as i64,
        feedback_count,
        average_rating,
        negative_count,
        negative_percentage,
        sla_compliance_percentage,
        performance_score: score,
    }
}

#[derive(Clone)]
pub struct FeedbackService {
    repo: Arc<dyn FeedbackRepository>,
    service_requests: Arc<dyn ServiceRequestRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl FeedbackService {
    pub fn new(
        repo: Arc<dyn FeedbackRepository>,
        service_requests: Arc<dyn ServiceRequestRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            service_requests,
            user_repo,
            notifications,
            clock,
        }
    }

    /// Customer rating for a completed ticket. One per ticket; ratings of
    /// two stars or less are escalated to the front office.
    pub async fn submit(&self, request: SubmitFeedbackRequest) -> ApiResult<Feedback> {
        if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
            return Err(ApiError::BadRequest(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let ticket = self
            .service_requests
            .get_service_request(request.service_request_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Service request {} not found",
                    request.service_request_id
                ))
            })?;

        if ticket.status != TicketStatus::Completed {
            return Err(ApiError::BadRequest(
                "Feedback can only be given for a completed service".to_string(),
            ));
        }
        if self
            .repo
            .get_feedback_for_service_request(ticket.id)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(
                "Feedback already submitted for this ticket".to_string(),
            ));
        }

        let customer_name = match request.customer_name.trim() {
            "" => ticket.customer_name.clone(),
            name => name.to_string(),
        };
        let is_negative = is_negative_rating(request.rating);

        let feedback = self
            .repo
            .create_feedback(&NewFeedback {
                service_request_id: ticket.id,
                customer_name,
                rating: request.rating,
                comment: trim_optional(request.comment),
                is_negative,
                escalated: is_negative,
                created_at: to_rfc3339(self.clock.now()),
            })
            .await?;

        info!(
            "Feedback {} ({} stars) received for {}",
            feedback.id, feedback.rating, ticket.ticket_no
        );

        if is_negative {
            self.notify_negative(&ticket, &feedback).await;
        }

        Ok(feedback)
    }

    async fn notify_negative(&self, ticket: &ServiceRequest, feedback: &Feedback) {
        let engineer_name = match ticket.assigned_to {
            Some(id) => self
                .user_repo
                .get_user_by_id(id)
                .await
                .ok()
                .flatten()
                .map(|u| u.full_name),
            None => None,
        };
        let comment: String = feedback
            .comment
            .as_deref()
            .unwrap_or("No comment")
            .chars()
            .take(100)
            .collect();

        let draft = NotificationDraft::new(
            NotificationType::NegativeFeedback,
            format!("Negative feedback - Ticket #{}", ticket.ticket_no),
            format!(
                "Customer gave {} stars for service by {}. Comment: {}",
                feedback.rating,
                engineer_name.as_deref().unwrap_or("an unassigned engineer"),
                comment
            ),
        )
        .with_priority(NotificationPriority::High)
        .with_action_url(format!("/admin/service-requests/{}", ticket.id));
        self.notifications
            .notify_roles(&[UserRole::Admin, UserRole::Reception], None, &draft)
            .await;
    }

    /// Feedback on the caller's own completed tickets.
    pub async fn my_feedback(&self, auth_user: &AuthenticatedUser) -> ApiResult<Vec<EngineerFeedback>> {
        if auth_user.role() != UserRole::ServiceEngineer {
            return Err(ApiError::Forbidden(
                "Only service engineers receive feedback".to_string(),
            ));
        }
        self.repo.list_engineer_feedback(auth_user.id()).await
    }

    /// Engineers see their own scores; admins may ask for any engineer.
    pub async fn engineer_analytics(
        &self,
        auth_user: &AuthenticatedUser,
        engineer_id: Option<i64>,
    ) -> ApiResult<EngineerAnalytics> {
        let engineer_id = match (auth_user.role(), engineer_id) {
            (UserRole::ServiceEngineer, None) => auth_user.id(),
            (UserRole::ServiceEngineer, Some(id)) if id == auth_user.id() => id,
            (_, Some(id)) if auth_user.can(Capability::EngineerAnalyticsView) => id,
            (_, None) if auth_user.can(Capability::EngineerAnalyticsView) => {
                return Err(ApiError::BadRequest("engineer_id is required".to_string()))
            }
            _ => {
                return Err(ApiError::Forbidden(
                    "You can only view your own analytics".to_string(),
                ))
            }
        };

        let engineer = self
            .user_repo
            .get_user_by_id(engineer_id)
            .await?
            .filter(|u| u.role == UserRole::ServiceEngineer)
            .ok_or_else(|| ApiError::NotFound(format!("Engineer {} not found", engineer_id)))?;

        self.analytics_for(&engineer).await
    }

    /// Every engineer, best performer first.
    pub async fn all_engineer_analytics(
        &self,
        auth_user: &AuthenticatedUser,
    ) -> ApiResult<Vec<EngineerAnalytics>> {
        auth_user.require(Capability::EngineerAnalyticsView)?;

        let engineers = self
            .user_repo
            .list_users(Some(UserRole::ServiceEngineer))
            .await?;

        let mut analytics = Vec::with_capacity(engineers.len());
        for engineer in &engineers {
            analytics.push(self.analytics_for(engineer).await?);
        }

        analytics.sort_by(|a, b| {
            b.performance_score
                .total_cmp(&a.performance_score)
                .then(a.engineer_id.cmp(&b.engineer_id))
        });
        Ok(analytics)
    }

    pub async fn negative(&self, auth_user: &AuthenticatedUser) -> ApiResult<Vec<Feedback>> {
        auth_user.require(Capability::FeedbackViewNegative)?;
        self.repo.list_negative_feedback().await
    }

    async fn analytics_for(&self, engineer: &User) -> ApiResult<EngineerAnalytics> {
        let completed = self
            .service_requests
            .list_service_requests(&ServiceRequestFilter {
                status: Some(TicketStatus::Completed),
                assigned_to: Some(engineer.id),
                ..Default::default()
            })
            .await?;
        let feedback: Vec<Feedback> = self
            .repo
            .list_engineer_feedback(engineer.id)
            .await?
            .into_iter()
            .map(|f| f.feedback)
            .collect();

        Ok(compute_engineer_analytics(engineer, &completed, &feedback))
    }
}
