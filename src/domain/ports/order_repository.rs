use crate::domain::entities::{NewOrder, Order, OrderStatus};
use crate::infrastructure::http::middleware::error::ApiResult;

/// Outcome recorded when an admin decides a pending order.
#[derive(Debug, Clone)]
pub struct OrderDecision {
    pub status: OrderStatus,
    pub invoice_number: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by: i64,
    pub decided_at: String,
}

#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> ApiResult<Order>;
    async fn get_order(&self, id: i64) -> ApiResult<Option<Order>>;
    async fn get_order_by_enquiry(&self, enquiry_id: i64) -> ApiResult<Option<Order>>;
    async fn list_orders(
        &self,
        salesman_id: Option<i64>,
        status: Option<OrderStatus>,
    ) -> ApiResult<Vec<Order>>;
    /// Rewrites the line of a still-pending order.
    async fn update_pending_order(&self, id: i64, order: &NewOrder, updated_at: &str)
        -> ApiResult<()>;
    /// Applies the decision only while the order is pending. Returns false
    /// when another decision got there first.
    async fn decide_order(&self, id: i64, decision: &OrderDecision) -> ApiResult<bool>;
    async fn count_invoices_with_prefix(&self, prefix: &str) -> ApiResult<i64>;
}
