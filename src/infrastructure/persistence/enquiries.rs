use crate::domain::entities::{Enquiry, EnquiryStatus, NewEnquiry};
use crate::domain::ports::enquiry_repository::EnquiryRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use crate::shared::utils::to_rfc3339;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const ENQUIRY_COLUMNS: &str = "id, enquiry_no, customer_name, phone, email, product_interest,
     priority, status, source, assigned_to, next_follow_up, notes, created_by, created_at,
     updated_at";

fn enquiry_from_row(row: &AnyRow) -> ApiResult<Enquiry> {
    let priority: String = row.try_get("priority")?;
    let status: String = row.try_get("status")?;

    Ok(Enquiry {
        id: row.try_get("id")?,
        enquiry_no: row.try_get("enquiry_no")?,
        customer_name: row.try_get("customer_name")?,
        phone: nullable(row, "phone")?,
        email: nullable(row, "email")?,
        product_interest: nullable(row, "product_interest")?,
        priority: priority.parse().map_err(ApiError::Internal)?,
        status: status.parse().map_err(ApiError::Internal)?,
        source: row.try_get("source")?,
        assigned_to: nullable(row, "assigned_to")?,
        next_follow_up: nullable(row, "next_follow_up")?,
        notes: nullable(row, "notes")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl EnquiryRepository for Database {
    async fn create_enquiry(&self, enquiry: &NewEnquiry) -> ApiResult<Enquiry> {
        let now = to_rfc3339(chrono::Utc::now());

        let result = sqlx::query(
            "INSERT INTO enquiries (
                enquiry_no, customer_name, phone, email, product_interest, priority, status,
                source, assigned_to, next_follow_up, notes, created_by, created_at, updated_at
             )
             VALUES (?, ?, ?, ?, ?, ?, 'NEW', ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&enquiry.enquiry_no)
        .bind(&enquiry.customer_name)
        .bind(&enquiry.phone)
        .bind(&enquiry.email)
        .bind(&enquiry.product_interest)
        .bind(enquiry.priority.as_str())
        .bind(&enquiry.source)
        .bind(enquiry.assigned_to)
        .bind(&enquiry.next_follow_up)
        .bind(&enquiry.notes)
        .bind(&enquiry.created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Enquiry {
            id: inserted_id(&result)?,
            enquiry_no: enquiry.enquiry_no.clone(),
            customer_name: enquiry.customer_name.clone(),
            phone: enquiry.phone.clone(),
            email: enquiry.email.clone(),
            product_interest: enquiry.product_interest.clone(),
            priority: enquiry.priority,
            status: EnquiryStatus::New,
            source: enquiry.source.clone(),
            assigned_to: enquiry.assigned_to,
            next_follow_up: enquiry.next_follow_up.clone(),
            notes: enquiry.notes.clone(),
            created_by: enquiry.created_by.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn get_enquiry(&self, id: i64) -> ApiResult<Option<Enquiry>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM enquiries WHERE id = ?",
            ENQUIRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(enquiry_from_row).transpose()
    }

    async fn list_enquiries(
        &self,
        assigned_to: Option<i64>,
        status: Option<EnquiryStatus>,
    ) -> ApiResult<Vec<Enquiry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM enquiries
             WHERE (? IS NULL OR assigned_to = ?)
               AND (? IS NULL OR status = ?)
             ORDER BY created_at DESC, id DESC",
            ENQUIRY_COLUMNS
        ))
        .bind(assigned_to)
        .bind(assigned_to)
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(enquiry_from_row).collect()
    }

    async fn update_enquiry(&self, enquiry: &Enquiry) -> ApiResult<()> {
        sqlx::query(
            "UPDATE enquiries
             SET customer_name = ?, phone = ?, email = ?, product_interest = ?, priority = ?,
                 status = ?, assigned_to = ?, next_follow_up = ?, notes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&enquiry.customer_name)
        .bind(&enquiry.phone)
        .bind(&enquiry.email)
        .bind(&enquiry.product_interest)
        .bind(enquiry.priority.as_str())
        .bind(enquiry.status.as_str())
        .bind(enquiry.assigned_to)
        .bind(&enquiry.next_follow_up)
        .bind(&enquiry.notes)
        .bind(&enquiry.updated_at)
        .bind(enquiry.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_enquiry_status(
        &self,
        id: i64,
        status: EnquiryStatus,
        updated_at: &str,
    ) -> ApiResult<()> {
        sqlx::query("UPDATE enquiries SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_enquiry(&self, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM enquiries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
