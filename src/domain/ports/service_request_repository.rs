use chrono::{DateTime, Utc};

use crate::domain::entities::{
    NewServiceRequest, ServiceRequest, ServiceRequestFilter, TicketStatus,
};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    async fn create_service_request(&self, request: &NewServiceRequest)
        -> ApiResult<ServiceRequest>;
    async fn get_service_request(&self, id: i64) -> ApiResult<Option<ServiceRequest>>;
    async fn get_service_request_by_ticket_no(
        &self,
        ticket_no: &str,
    ) -> ApiResult<Option<ServiceRequest>>;

    /// Newest first.
    async fn list_service_requests_by_phone(&self, phone: &str) -> ApiResult<Vec<ServiceRequest>>;

    /// Newest first.
    async fn list_service_requests(
        &self,
        filter: &ServiceRequestFilter,
    ) -> ApiResult<Vec<ServiceRequest>>;

    /// Tickets whose status still runs an SLA clock.
    async fn list_open_service_requests(&self) -> ApiResult<Vec<ServiceRequest>>;

    /// Tickets assigned to an engineer, optionally bounded by creation time.
    async fn list_engineer_service_requests(
        &self,
        engineer_id: i64,
        created_from: Option<DateTime<Utc>>,
        created_to: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<ServiceRequest>>;

    async fn assign_service_request(
        &self,
        id: i64,
        engineer_id: i64,
        updated_at: DateTime<Utc>,
    ) -> ApiResult<()>;

    /// Persists status, resolution fields, completion stamp and `updated_at`,
    /// only while the stored status is still `expected`. Returns false when
    /// another writer moved the ticket first.
    async fn update_service_request_status(
        &self,
        request: &ServiceRequest,
        expected: TicketStatus,
    ) -> ApiResult<bool>;

    async fn mark_sla_warning_sent(&self, id: i64) -> ApiResult<()>;
    async fn mark_sla_breach_sent(&self, id: i64) -> ApiResult<()>;
}
