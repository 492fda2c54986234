use crate::domain::entities::{EngineerFeedback, Feedback, NewFeedback};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create_feedback(&self, feedback: &NewFeedback) -> ApiResult<Feedback>;
    async fn get_feedback_for_service_request(
        &self,
        service_request_id: i64,
    ) -> ApiResult<Option<Feedback>>;
    /// Feedback on the engineer's completed tickets, newest first.
    async fn list_engineer_feedback(&self, engineer_id: i64) -> ApiResult<Vec<EngineerFeedback>>;
    /// Newest first.
    async fn list_negative_feedback(&self) -> ApiResult<Vec<Feedback>>;
}
