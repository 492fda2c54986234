use crate::domain::entities::{
    NewServiceRequest, ServiceRequest, ServiceRequestFilter, TicketStatus,
};
use crate::domain::ports::service_request_repository::ServiceRequestRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use crate::shared::utils::{parse_rfc3339, to_rfc3339};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{any::AnyRow, Row};

const SERVICE_REQUEST_COLUMNS: &str = "id, ticket_no, customer_name, phone, email, company, address,
     machine_model, fault_description, priority, status, assigned_to, sla_warning_sent,
     sla_breach_sent, resolution_notes, parts_replaced, feedback_url, created_at, updated_at,
     completed_at";

fn service_request_from_row(row: &AnyRow) -> ApiResult<ServiceRequest> {
    let priority: String = row.try_get("priority")?;
    let status: String = row.try_get("status")?;
    let sla_warning_sent: i32 = row.try_get("sla_warning_sent")?;
    let sla_breach_sent: i32 = row.try_get("sla_breach_sent")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let completed_at: Option<String> = nullable(row, "completed_at")?;

    Ok(ServiceRequest {
        id: row.try_get("id")?,
        ticket_no: row.try_get("ticket_no")?,
        customer_name: row.try_get("customer_name")?,
        phone: nullable(row, "phone")?,
        email: nullable(row, "email")?,
        company: nullable(row, "company")?,
        address: nullable(row, "address")?,
        machine_model: nullable(row, "machine_model")?,
        fault_description: nullable(row, "fault_description")?,
        priority: priority.parse().map_err(ApiError::Internal)?,
        status: status.parse().map_err(ApiError::Internal)?,
        assigned_to: nullable(row, "assigned_to")?,
        sla_warning_sent: sla_warning_sent != 0,
        sla_breach_sent: sla_breach_sent != 0,
        resolution_notes: nullable(row, "resolution_notes")?,
        parts_replaced: nullable(row, "parts_replaced")?,
        feedback_url: nullable(row, "feedback_url")?,
        created_at: parse_rfc3339(&created_at)?,
        updated_at: parse_rfc3339(&updated_at)?,
        completed_at: completed_at.as_deref().map(parse_rfc3339).transpose()?,
    })
}

fn collect(rows: Vec<AnyRow>) -> ApiResult<Vec<ServiceRequest>> {
    rows.iter().map(service_request_from_row).collect()
}

#[async_trait]
impl ServiceRequestRepository for Database {
    async fn create_service_request(
        &self,
        request: &NewServiceRequest,
    ) -> ApiResult<ServiceRequest> {
        let created_at = to_rfc3339(request.created_at);

        let result = sqlx::query(
            "INSERT INTO service_requests (
                ticket_no, customer_name, phone, email, company, address, machine_model,
                fault_description, priority, status, assigned_to, created_at, updated_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'ASSIGNED', ?, ?, ?)",
        )
        .bind(&request.ticket_no)
        .bind(&request.customer_name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.company)
        .bind(&request.address)
        .bind(&request.machine_model)
        .bind(&request.fault_description)
        .bind(request.priority.as_str())
        .bind(request.assigned_to)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        self.get_service_request(inserted_id(&result)?)
            .await?
            .ok_or_else(|| ApiError::Internal("Service request vanished after insert".to_string()))
    }

    async fn get_service_request(&self, id: i64) -> ApiResult<Option<ServiceRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM service_requests WHERE id = ?",
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(service_request_from_row).transpose()
    }

    async fn get_service_request_by_ticket_no(
        &self,
        ticket_no: &str,
    ) -> ApiResult<Option<ServiceRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM service_requests WHERE ticket_no = ?",
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(ticket_no)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(service_request_from_row).transpose()
    }

    async fn list_service_requests_by_phone(&self, phone: &str) -> ApiResult<Vec<ServiceRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM service_requests WHERE phone = ? ORDER BY created_at DESC, id DESC",
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn list_service_requests(
        &self,
        filter: &ServiceRequestFilter,
    ) -> ApiResult<Vec<ServiceRequest>> {
        // NULL-or-match keeps a single statement for every filter combination
        let rows = sqlx::query(&format!(
            "SELECT {} FROM service_requests
             WHERE (? IS NULL OR status = ?)
               AND (? IS NULL OR priority = ?)
               AND (? IS NULL OR assigned_to = ?)
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.priority.map(|p| p.as_str()))
        .bind(filter.priority.map(|p| p.as_str()))
        .bind(filter.assigned_to)
        .bind(filter.assigned_to)
        .bind(filter.limit.unwrap_or(-1))
        .bind(filter.offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn list_open_service_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM service_requests
             WHERE status NOT IN ('COMPLETED', 'CLOSED')
             ORDER BY created_at ASC",
            SERVICE_REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn list_engineer_service_requests(
        &self,
        engineer_id: i64,
        created_from: Option<DateTime<Utc>>,
        created_to: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<ServiceRequest>> {
        let from = created_from.map(to_rfc3339);
        let to = created_to.map(to_rfc3339);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM service_requests
             WHERE assigned_to = ?
               AND (? IS NULL OR created_at >= ?)
               AND (? IS NULL OR created_at <= ?)
             ORDER BY created_at DESC, id DESC",
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(engineer_id)
        .bind(&from)
        .bind(&from)
        .bind(&to)
        .bind(&to)
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn assign_service_request(
        &self,
        id: i64,
        engineer_id: i64,
        updated_at: DateTime<Utc>,
    ) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE service_requests SET assigned_to = ?, updated_at = ? WHERE id = ?",
        )
        .bind(engineer_id)
        .bind(to_rfc3339(updated_at))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Service request {} not found", id)));
        }
        Ok(())
    }

    async fn update_service_request_status(
        &self,
        request: &ServiceRequest,
        expected: TicketStatus,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE service_requests
             SET status = ?, resolution_notes = ?, parts_replaced = ?, feedback_url = ?,
                 completed_at = ?, updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(request.status.as_str())
        .bind(&request.resolution_notes)
        .bind(&request.parts_replaced)
        .bind(&request.feedback_url)
        .bind(request.completed_at.map(to_rfc3339))
        .bind(to_rfc3339(request.updated_at))
        .bind(request.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_sla_warning_sent(&self, id: i64) -> ApiResult<()> {
        sqlx::query("UPDATE service_requests SET sla_warning_sent = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_sla_breach_sent(&self, id: i64) -> ApiResult<()> {
        sqlx::query("UPDATE service_requests SET sla_breach_sent = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
