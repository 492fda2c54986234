use crate::domain::entities::Job;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Durable queue of background jobs.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, job_type: &str, payload: Value, max_retries: i32) -> ApiResult<String>;
    async fn enqueue_at(
        &self,
        job_type: &str,
        payload: Value,
        run_at: DateTime<Utc>,
        max_retries: i32,
    ) -> ApiResult<String>;
    /// Claims the oldest due job, if any.
    async fn fetch_next_job(&self) -> ApiResult<Option<Job>>;
    async fn complete_job(&self, job_id: &str) -> ApiResult<()>;
    async fn fail_job(&self, job_id: &str, error: &str) -> ApiResult<()>;
    /// True when a job of this type is already pending or running.
    async fn has_active_job(&self, job_type: &str) -> ApiResult<bool>;
}
