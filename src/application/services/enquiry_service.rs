use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::domain::entities::{
    generate_enquiry_no, AuditAction, AuditModule, Enquiry, EnquiryChanges, EnquiryPriority, EnquiryStatus, NewEnquiry,
    NotificationDraft, NotificationPriority, NotificationType, UserRole,
};
use crate::domain::ports::{
    enquiry_repository::EnquiryRepository, time_service::Clock, user_repository::UserRepository,
};
use crate::domain::services::Capability;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};
use crate::shared::utils::{
    normalize_optional_email, normalize_optional_phone, require_non_empty, to_rfc3339,
    trim_optional,
};

pub const WEBSITE_VISITOR: &str = "Website Visitor";
pub const WEBSITE_SOURCE: &str = "website";
pub const DEFAULT_SOURCE: &str = "walk-in";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEnquiryRequest {
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub product_interest: Option<String>,
    #[serde(default)]
    pub priority: EnquiryPriority,
    pub source: Option<String>,
    pub assigned_to: Option<i64>,
    pub next_follow_up: Option<String>,
    pub notes: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEnquiryRequest {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub product_interest: Option<String>,
    pub priority: Option<EnquiryPriority>,
    pub status: Option<EnquiryStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<i64>>,
    pub next_follow_up: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnquiryQuery {
    pub assigned_to: Option<i64>,
    pub status: Option<EnquiryStatus>,
}

#[derive(Clone)]
pub struct EnquiryService {
    repo: Arc<dyn EnquiryRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifications: super::NotificationService,
    audit: super::AuditService,
    clock: Arc<dyn Clock>,
}

impl EnquiryService {
    pub fn new(
        repo: Arc<dyn EnquiryRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifications: super::NotificationService,
        audit: super::AuditService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            user_repo,
            notifications,
            audit,
            clock,
        }
    }

    async fn require_salesman(&self, user_id: i64) -> ApiResult<()> {
        let user = self
            .user_repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))?;

        if user.role != UserRole::Salesman || !user.is_active {
            return Err(ApiError::BadRequest(format!(
                "User {} is not an active salesman",
                user_id
            )));
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> ApiResult<Enquiry> {
        self.repo
            .get_enquiry(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Enquiry not found".to_string()))
    }

    fn build_new(
        &self,
        request: CreateEnquiryRequest,
        source: String,
        created_by: String,
    ) -> ApiResult<NewEnquiry> {
        Ok(NewEnquiry {
            enquiry_no: generate_enquiry_no(self.clock.now()),
            customer_name: require_non_empty("Customer name", &request.customer_name)?,
            phone: normalize_optional_phone(request.phone)?,
            email: normalize_optional_email(request.email)?,
            product_interest: trim_optional(request.product_interest),
            priority: request.priority,
            source,
            assigned_to: request.assigned_to,
            next_follow_up: trim_optional(request.next_follow_up),
            notes: trim_optional(request.notes),
            created_by,
        })
    }

    /// Staff intake. Salesmen always own the enquiries they log.
    pub async fn create(
        &self,
        auth_user: &AuthenticatedUser,
        mut request: CreateEnquiryRequest,
    ) -> ApiResult<Enquiry> {
        auth_user.require(Capability::EnquiriesCreate)?;

        if auth_user.role() == UserRole::Salesman {
            request.assigned_to = Some(auth_user.id());
        } else if let Some(assignee) = request.assigned_to {
            self.require_salesman(assignee).await?;
        }

        let source =
            trim_optional(request.source.take()).unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        let new_enquiry = self.build_new(request, source, auth_user.user.full_name.clone())?;
        let enquiry = self.repo.create_enquiry(&new_enquiry).await?;

        info!(
            "User {} logged enquiry {}",
            auth_user.user.username, enquiry.enquiry_no
        );
        self.notify_created(&enquiry, &auth_user.user.full_name, Some(auth_user.id()))
            .await;

        Ok(enquiry)
    }

    /// Website form. Lands unassigned for reception to triage.
    pub async fn create_public(&self, request: CreateEnquiryRequest) -> ApiResult<Enquiry> {
        if request.phone.as_deref().map_or(true, |p| p.trim().is_empty())
            && request.email.as_deref().map_or(true, |e| e.trim().is_empty())
        {
            return Err(ApiError::BadRequest(
                "Phone or email is required".to_string(),
            ));
        }

        let new_enquiry = self.build_new(
            CreateEnquiryRequest {
                assigned_to: None,
                ..request
            },
            WEBSITE_SOURCE.to_string(),
            WEBSITE_VISITOR.to_string(),
        )?;
        let enquiry = self.repo.create_enquiry(&new_enquiry).await?;

        info!("Website enquiry {} received", enquiry.enquiry_no);
        self.notify_created(&enquiry, WEBSITE_VISITOR, None).await;

        Ok(enquiry)
    }

    async fn notify_created(&self, enquiry: &Enquiry, created_by: &str, creator: Option<i64>) {
        let action_url = format!("/enquiries/{}", enquiry.id);

        if let Some(assignee) = enquiry.assigned_to.filter(|id| Some(*id) != creator) {
            self.notify_assignee(enquiry, assignee, created_by).await;
        }

        let office = NotificationDraft::new(
            NotificationType::EnquiryNew,
            format!("New Enquiry: {}", enquiry.customer_name),
            format!(
                "New enquiry submitted by {}. Customer: {}, Phone: {}. Priority: {}.",
                created_by,
                enquiry.customer_name,
                enquiry.phone.as_deref().unwrap_or("-"),
                enquiry.priority.as_str()
            ),
        )
        .with_priority(if enquiry.assigned_to.is_none() {
            NotificationPriority::High
        } else {
            NotificationPriority::Normal
        })
        .with_action_url(action_url);

        let recipients = [UserRole::Admin, UserRole::Reception];
        let mut ids = Vec::new();
        for role in recipients {
            match self.user_repo.list_active_user_ids_by_role(role).await {
                Ok(found) => ids.extend(found.into_iter().filter(|id| Some(*id) != creator)),
                Err(e) => tracing::error!("Failed to resolve {} recipients: {}", role, e),
            }
        }
        self.notifications.notify_users(ids, &office).await;
    }

    async fn notify_assignee(&self, enquiry: &Enquiry, assignee: i64, assigned_by: &str) {
        let draft = NotificationDraft::new(
            NotificationType::EnquiryNew,
            format!("New Enquiry Assigned: {}", enquiry.customer_name),
            format!(
                "A new enquiry from {} has been assigned to you by {}. Priority: {}. Follow up required.",
                enquiry.customer_name,
                assigned_by,
                enquiry.priority.as_str()
            ),
        )
        .with_priority(if enquiry.priority == EnquiryPriority::Hot {
            NotificationPriority::High
        } else {
            NotificationPriority::Normal
        })
        .with_action_url(format!("/enquiries/{}", enquiry.id));

        self.notifications.notify_users([assignee], &draft).await;
    }

    /// Office staff see everything; salesmen only their own leads.
    pub async fn list(
        &self,
        auth_user: &AuthenticatedUser,
        query: EnquiryQuery,
    ) -> ApiResult<Vec<Enquiry>> {
        let assigned_to = if auth_user.can(Capability::EnquiriesViewAll) {
            query.assigned_to
        } else if auth_user.role() == UserRole::Salesman {
            Some(auth_user.id())
        } else {
            auth_user.require(Capability::EnquiriesViewAll)?;
            None
        };

        self.repo.list_enquiries(assigned_to, query.status).await
    }

    pub async fn get(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<Enquiry> {
        let enquiry = self.load(id).await?;

        if !auth_user.can(Capability::EnquiriesViewAll)
            && !(auth_user.role() == UserRole::Salesman && enquiry.assigned_to == Some(auth_user.id()))
        {
            return Err(ApiError::Forbidden(
                "You can only view enquiries assigned to you".to_string(),
            ));
        }

        Ok(enquiry)
    }

    pub async fn update(
        &self,
        auth_user: &AuthenticatedUser,
        id: i64,
        request: UpdateEnquiryRequest,
    ) -> ApiResult<Enquiry> {
        auth_user.require(Capability::EnquiriesManage)?;

        let mut enquiry = self.load(id).await?;
        if let Some(Some(assignee)) = request.assigned_to {
            self.require_salesman(assignee).await?;
        }

        let customer_name = match request.customer_name {
            Some(name) => Some(require_non_empty("Customer name", &name)?),
            None => None,
        };
        let changes = EnquiryChanges {
            customer_name,
            phone: normalize_optional_phone(request.phone)?,
            email: normalize_optional_email(request.email)?,
            product_interest: trim_optional(request.product_interest),
            priority: request.priority,
            status: request.status,
            assigned_to: request.assigned_to,
            next_follow_up: trim_optional(request.next_follow_up),
            notes: trim_optional(request.notes),
        };

        let new_assignee = changes.apply_to(&mut enquiry);
        enquiry.updated_at = to_rfc3339(self.clock.now());
        self.repo.update_enquiry(&enquiry).await?;

        info!(
            "User {} updated enquiry {}",
            auth_user.user.username, enquiry.enquiry_no
        );

        if let Some(assignee) = new_assignee {
            self.notify_assignee(&enquiry, assignee, &auth_user.user.full_name)
                .await;
        }

        Ok(enquiry)
    }

    pub async fn delete(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<()> {
        auth_user.require(Capability::EnquiriesManage)?;

        if !self.repo.delete_enquiry(id).await? {
            return Err(ApiError::NotFound("Enquiry not found".to_string()));
        }

        info!("User {} deleted enquiry {}", auth_user.user.username, id);
        self.audit
            .record(auth_user, AuditAction::Delete, AuditModule::Enquiries, id, None)
            .await;
        Ok(())
    }

    /// Marks an enquiry converted once an order is raised against it.
    pub async fn mark_converted(&self, enquiry: &Enquiry) -> ApiResult<()> {
        if enquiry.status == EnquiryStatus::Converted {
            return Ok(());
        }
        self.repo
            .set_enquiry_status(
                enquiry.id,
                EnquiryStatus::Converted,
                &to_rfc3339(self.clock.now()),
            )
            .await
    }

    pub(crate) async fn load_for_order(&self, id: i64) -> ApiResult<Enquiry> {
        self.load(id).await
    }
}
