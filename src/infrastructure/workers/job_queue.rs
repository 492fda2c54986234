use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{any::AnyRow, Row};
use uuid::Uuid;

use crate::domain::entities::{Job, JobStatus};
use crate::domain::ports::task_queue::TaskQueue;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{nullable, Database};
use crate::shared::utils::{parse_rfc3339, to_rfc3339};

/// Claimed jobs are considered abandoned after this long.
const LOCK_TIMEOUT_MINUTES: i64 = 5;

/// SQLite implementation of the TaskQueue
#[derive(Clone)]
pub struct SqliteTaskQueue {
    db: Database,
}

impl SqliteTaskQueue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn job_from_row(row: &AnyRow) -> ApiResult<Job> {
    let status: String = row.try_get("status")?;
    let payload: String = row.try_get("payload")?;
    let run_at: String = row.try_get("run_at")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Job {
        id: row.try_get("id")?,
        job_type: row.try_get("job_type")?,
        payload: serde_json::from_str(&payload).unwrap_or(Value::Null),
        status: JobStatus::from(status.as_str()),
        run_at: parse_rfc3339(&run_at)?,
        created_at: parse_rfc3339(&created_at)?,
        updated_at: parse_rfc3339(&updated_at)?,
        attempts: row.try_get("attempts")?,
        max_attempts: row.try_get("max_attempts")?,
        last_error: nullable(row, "last_error")?,
    })
}

#[async_trait]
impl TaskQueue for SqliteTaskQueue {
    async fn enqueue(&self, job_type: &str, payload: Value, max_attempts: i32) -> ApiResult<String> {
        self.enqueue_at(job_type, payload, Utc::now(), max_attempts)
            .await
    }

    async fn enqueue_at(
        &self,
        job_type: &str,
        payload: Value,
        run_at: DateTime<Utc>,
        max_attempts: i32,
    ) -> ApiResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = to_rfc3339(Utc::now());
        let payload = serde_json::to_string(&payload)
            .map_err(|e| ApiError::Internal(format!("Unserializable job payload: {}", e)))?;

        sqlx::query(
            "INSERT INTO jobs (id, job_type, payload, status, run_at, created_at, updated_at, max_attempts)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(job_type)
        .bind(&payload)
        .bind(JobStatus::Pending.as_str())
        .bind(to_rfc3339(run_at))
        .bind(&now)
        .bind(&now)
        .bind(max_attempts)
        .execute(self.db.pool())
        .await?;

        Ok(id)
    }

    async fn fetch_next_job(&self) -> ApiResult<Option<Job>> {
        let now = Utc::now();
        let locked_until = now + chrono::Duration::minutes(LOCK_TIMEOUT_MINUTES);
        let now = to_rfc3339(now);

        let mut tx = self.db.pool().begin().await?;

        // Abandoned claims go back to the pool first
        sqlx::query(
            "UPDATE jobs SET status = 'pending', locked_until = NULL, updated_at = ?
             WHERE status = 'processing' AND locked_until < ?",
        )
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let candidate = sqlx::query(
            "SELECT id FROM jobs
             WHERE status = 'pending' AND run_at <= ?
             ORDER BY run_at ASC
             LIMIT 1",
        )
        .bind(&now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(candidate) = candidate else {
            tx.commit().await?;
            return Ok(None);
        };
        let id: String = candidate.try_get("id")?;

        // Only one worker wins the pending -> processing edge
        let claimed = sqlx::query(
            "UPDATE jobs
             SET status = 'processing', updated_at = ?, locked_until = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(&now)
        .bind(to_rfc3339(locked_until))
        .bind(&id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query(
            "SELECT id, job_type, payload, status, run_at, created_at, updated_at,
                    attempts, max_attempts, last_error
             FROM jobs WHERE id = ?",
        )
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        job_from_row(&row).map(Some)
    }

    async fn complete_job(&self, job_id: &str) -> ApiResult<()> {
        sqlx::query(
            "UPDATE jobs
             SET status = 'completed', locked_until = NULL, updated_at = ?
             WHERE id = ?",
        )
        .bind(to_rfc3339(Utc::now()))
        .bind(job_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn fail_job(&self, job_id: &str, error: &str) -> ApiResult<()> {
        let now = Utc::now();

        let row = sqlx::query("SELECT attempts, max_attempts FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_one(self.db.pool())
            .await?;

        let attempts: i32 = row.try_get("attempts")?;
        let max_attempts: i32 = row.try_get("max_attempts")?;
        let new_attempts = attempts + 1;

        if new_attempts < max_attempts {
            // Exponential backoff: 2^attempts * 30 seconds
            let backoff_seconds = 30_i64 << attempts.clamp(0, 16);
            let next_run = now + chrono::Duration::seconds(backoff_seconds);

            sqlx::query(
                "UPDATE jobs
                 SET status = 'pending', attempts = ?, last_error = ?, run_at = ?,
                     locked_until = NULL, updated_at = ?
                 WHERE id = ?",
            )
            .bind(new_attempts)
            .bind(error)
            .bind(to_rfc3339(next_run))
            .bind(to_rfc3339(now))
            .bind(job_id)
            .execute(self.db.pool())
            .await?;
        } else {
            sqlx::query(
                "UPDATE jobs
                 SET status = 'failed', attempts = ?, last_error = ?, locked_until = NULL,
                     updated_at = ?
                 WHERE id = ?",
            )
            .bind(new_attempts)
            .bind(error)
            .bind(to_rfc3339(now))
            .bind(job_id)
            .execute(self.db.pool())
            .await?;
        }

        Ok(())
    }

    async fn has_active_job(&self, job_type: &str) -> ApiResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM jobs
             WHERE job_type = ? AND status IN ('pending', 'processing')",
        )
        .bind(job_type)
        .fetch_one(self.db.pool())
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }
}
