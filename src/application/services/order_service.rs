use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::entities::{
    format_invoice_number, generate_order_no, invoice_prefix, price_line, AuditAction,
    AuditModule, NewOrder,
    NotificationDraft, NotificationPriority, NotificationType, Order, OrderStatus, UserRole,
};
use crate::domain::ports::{
    order_repository::{OrderDecision, OrderRepository},
    time_service::Clock,
};
use crate::domain::services::Capability;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};
use crate::shared::utils::to_rfc3339;

use super::{AttendanceService, AuditService, EnquiryService, NotificationService};

pub const FALLBACK_PRODUCT_NAME: &str = "General Product";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub enquiry_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    pub product_name: Option<String>,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.quantity < 1 {
            return Err(ApiError::BadRequest("Quantity must be at least 1".to_string()));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(ApiError::BadRequest(
                "Unit price must not be negative".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.discount_percent) {
            return Err(ApiError::BadRequest(
                "Discount must be between 0 and 100 percent".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub salesman_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectOrderRequest {
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    enquiries: EnquiryService,
    attendance: AttendanceService,
    notifications: NotificationService,
    audit: AuditService,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        enquiries: EnquiryService,
        attendance: AttendanceService,
        notifications: NotificationService,
        audit: AuditService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            enquiries,
            attendance,
            notifications,
            audit,
            clock,
        }
    }

    async fn load(&self, id: i64) -> ApiResult<Order> {
        self.repo
            .get_order(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
    }

    /// Raises an order against an enquiry, or rewrites the enquiry's order
    /// while it is still pending.
    pub async fn create(
        &self,
        auth_user: &AuthenticatedUser,
        request: CreateOrderRequest,
    ) -> ApiResult<Order> {
        auth_user.require(Capability::OrdersCreate)?;
        request.validate()?;

        let is_salesman = auth_user.role() == UserRole::Salesman;
        if is_salesman && !self.attendance.has_checked_in_today(auth_user.id()).await? {
            return Err(ApiError::Forbidden(
                "Attendance not marked for today".to_string(),
            ));
        }

        let enquiry = self.enquiries.load_for_order(request.enquiry_id).await?;
        if is_salesman && enquiry.assigned_to != Some(auth_user.id()) {
            return Err(ApiError::Forbidden(
                "You can only create orders for your assigned enquiries".to_string(),
            ));
        }

        let (discount_amount, total_amount) =
            price_line(request.unit_price, request.quantity, request.discount_percent);
        let product_name = request
            .product_name
            .as_deref()
            .or(enquiry.product_interest.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_PRODUCT_NAME)
            .to_string();
        let now = self.clock.now();

        let line = NewOrder {
            order_no: generate_order_no(now),
            enquiry_id: enquiry.id,
            salesman_id: enquiry.assigned_to,
            customer_name: enquiry.customer_name.clone(),
            product_name,
            quantity: request.quantity,
            unit_price: request.unit_price,
            discount_percent: request.discount_percent,
            discount_amount,
            total_amount,
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };

        if let Some(existing) = self.repo.get_order_by_enquiry(enquiry.id).await? {
            if existing.status != OrderStatus::Pending {
                return Err(ApiError::Conflict(format!(
                    "Cannot modify order - status is {}",
                    existing.status
                )));
            }

            self.repo
                .update_pending_order(existing.id, &line, &to_rfc3339(now))
                .await?;
            info!(
                "User {} revised pending order {}",
                auth_user.user.username, existing.order_no
            );
            return self.load(existing.id).await;
        }

        let order = self.repo.create_order(&line).await?;
        self.enquiries.mark_converted(&enquiry).await?;

        info!(
            "User {} created order {} from enquiry {}",
            auth_user.user.username, order.order_no, enquiry.enquiry_no
        );

        let draft = NotificationDraft::new(
            NotificationType::OrderPending,
            format!("New Order Pending Approval: {}", order.order_no),
            format!(
                "Order created by {} for {}. {} x {}, total {:.2}",
                auth_user.user.full_name,
                order.customer_name,
                order.quantity,
                order.product_name,
                order.total_amount
            ),
        )
        .with_priority(NotificationPriority::High)
        .with_action_url(format!("/admin/orders/{}", order.id));
        self.notifications
            .notify_roles(&[UserRole::Admin], None, &draft)
            .await;

        Ok(order)
    }

    pub async fn list(&self, auth_user: &AuthenticatedUser, query: OrderQuery) -> ApiResult<Vec<Order>> {
        let salesman_id = if auth_user.can(Capability::OrdersViewAll) {
            query.salesman_id
        } else if auth_user.role() == UserRole::Salesman {
            Some(auth_user.id())
        } else {
            auth_user.require(Capability::OrdersViewAll)?;
            None
        };

        self.repo.list_orders(salesman_id, query.status).await
    }

    pub async fn get(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<Order> {
        let order = self.load(id).await?;

        if !auth_user.can(Capability::OrdersViewAll) && order.salesman_id != Some(auth_user.id()) {
            return Err(ApiError::Forbidden(
                "You can only view your own orders".to_string(),
            ));
        }

        Ok(order)
    }

    pub async fn approve(&self, auth_user: &AuthenticatedUser, id: i64) -> ApiResult<Order> {
        auth_user.require(Capability::OrdersApprove)?;

        let order = self.load(id).await?;
        if order.status != OrderStatus::Pending {
            return Err(ApiError::BadRequest("Order is not pending approval".to_string()));
        }

        let now = self.clock.now();
        let prefix = invoice_prefix(now);
        let sequence = self.repo.count_invoices_with_prefix(&prefix).await? + 1;
        let invoice_number = format_invoice_number(&prefix, sequence);

        let decision = OrderDecision {
            status: OrderStatus::Approved,
            invoice_number: Some(invoice_number.clone()),
            rejection_reason: None,
            approved_by: auth_user.id(),
            decided_at: to_rfc3339(now),
        };
        let order = self.decide(order, decision).await?;

        info!(
            "User {} approved order {} (invoice {})",
            auth_user.user.username, order.order_no, invoice_number
        );
        self.audit
            .record(
                auth_user,
                AuditAction::Approve,
                AuditModule::Orders,
                order.id,
                Some(json!({ "invoice_number": invoice_number })),
            )
            .await;

        if let Some(salesman_id) = order.salesman_id {
            let draft = NotificationDraft::new(
                NotificationType::OrderApproved,
                format!("Order Approved: {}", order.order_no),
                format!(
                    "Your order {} has been approved by {}. Invoice {}.",
                    order.order_no, auth_user.user.full_name, invoice_number
                ),
            )
            .with_action_url(format!("/salesman/orders/{}", order.id));
            self.notifications.notify_users([salesman_id], &draft).await;
        }

        Ok(order)
    }

    pub async fn reject(
        &self,
        auth_user: &AuthenticatedUser,
        id: i64,
        reason: Option<String>,
    ) -> ApiResult<Order> {
        auth_user.require(Capability::OrdersApprove)?;

        let order = self.load(id).await?;
        if order.status != OrderStatus::Pending {
            return Err(ApiError::BadRequest("Order is not pending approval".to_string()));
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "No reason provided".to_string());

        let decision = OrderDecision {
            status: OrderStatus::Rejected,
            invoice_number: None,
            rejection_reason: Some(reason.clone()),
            approved_by: auth_user.id(),
            decided_at: to_rfc3339(self.clock.now()),
        };
        let order = self.decide(order, decision).await?;

        info!(
            "User {} rejected order {}: {}",
            auth_user.user.username, order.order_no, reason
        );
        self.audit
            .record(
                auth_user,
                AuditAction::Reject,
                AuditModule::Orders,
                order.id,
                Some(json!({ "reason": reason })),
            )
            .await;

        if let Some(salesman_id) = order.salesman_id {
            let draft = NotificationDraft::new(
                NotificationType::OrderRejected,
                format!("Order Rejected: {}", order.order_no),
                format!(
                    "Your order {} has been rejected by {}. Reason: {}",
                    order.order_no, auth_user.user.full_name, reason
                ),
            )
            .with_priority(NotificationPriority::High)
            .with_action_url(format!("/salesman/orders/{}", order.id));
            self.notifications.notify_users([salesman_id], &draft).await;
        }

        Ok(order)
    }

    async fn decide(&self, mut order: Order, decision: OrderDecision) -> ApiResult<Order> {
        if !self.repo.decide_order(order.id, &decision).await? {
            warn!("Order {} was decided concurrently", order.order_no);
            return Err(ApiError::Conflict(
                "Order has already been decided".to_string(),
            ));
        }

        order.status = decision.status;
        order.invoice_number = decision.invoice_number;
        order.rejection_reason = decision.rejection_reason;
        order.approved_by = Some(decision.approved_by);
        order.updated_at = decision.decided_at.clone();
        order.decided_at = Some(decision.decided_at);
        Ok(order)
    }
}
