use crate::domain::entities::{EngineerFeedback, Feedback, NewFeedback};
use crate::domain::ports::feedback_repository::FeedbackRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const FEEDBACK_COLUMNS: &str = "f.id, f.service_request_id, f.customer_name, f.rating, f.comment,
     f.is_negative, f.escalated, f.created_at";

fn feedback_from_row(row: &AnyRow) -> ApiResult<Feedback> {
    let is_negative: i32 = row.try_get("is_negative")?;
    let escalated: i32 = row.try_get("escalated")?;

    Ok(Feedback {
        id: row.try_get("id")?,
        service_request_id: row.try_get("service_request_id")?,
        customer_name: row.try_get("customer_name")?,
        rating: row.try_get("rating")?,
        comment: nullable(row, "comment")?,
        is_negative: is_negative != 0,
        escalated: escalated != 0,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl FeedbackRepository for Database {
    async fn create_feedback(&self, feedback: &NewFeedback) -> ApiResult<Feedback> {
        let result = sqlx::query(
            "INSERT INTO feedback (
                service_request_id, customer_name, rating, comment, is_negative, escalated,
                created_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feedback.service_request_id)
        .bind(&feedback.customer_name)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(feedback.is_negative as i32)
        .bind(feedback.escalated as i32)
        .bind(&feedback.created_at)
        .execute(&self.pool)
        .await?;

        Ok(Feedback {
            id: inserted_id(&result)?,
            service_request_id: feedback.service_request_id,
            customer_name: feedback.customer_name.clone(),
            rating: feedback.rating,
            comment: feedback.comment.clone(),
            is_negative: feedback.is_negative,
            escalated: feedback.escalated,
            created_at: feedback.created_at.clone(),
        })
    }

    async fn get_feedback_for_service_request(
        &self,
        service_request_id: i64,
    ) -> ApiResult<Option<Feedback>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM feedback f WHERE f.service_request_id = ?",
            FEEDBACK_COLUMNS
        ))
        .bind(service_request_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(feedback_from_row).transpose()
    }

    async fn list_engineer_feedback(&self, engineer_id: i64) -> ApiResult<Vec<EngineerFeedback>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, sr.ticket_no, sr.fault_description, sr.address, sr.company
             FROM feedback f
             JOIN service_requests sr ON sr.id = f.service_request_id
             WHERE sr.assigned_to = ? AND sr.status = 'COMPLETED'
             ORDER BY f.created_at DESC, f.id DESC",
            FEEDBACK_COLUMNS
        ))
        .bind(engineer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> ApiResult<EngineerFeedback> {
                Ok(EngineerFeedback {
                    feedback: feedback_from_row(row)?,
                    ticket_no: row.try_get("ticket_no")?,
                    fault_description: nullable(row, "fault_description")?,
                    address: nullable(row, "address")?,
                    company: nullable(row, "company")?,
                })
            })
            .collect()
    }

    async fn list_negative_feedback(&self) -> ApiResult<Vec<Feedback>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM feedback f
             WHERE f.is_negative = 1
             ORDER BY f.created_at DESC, f.id DESC",
            FEEDBACK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(feedback_from_row).collect()
    }
}
