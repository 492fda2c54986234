use crate::domain::entities::{Enquiry, EnquiryStatus, NewEnquiry};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait EnquiryRepository: Send + Sync {
    async fn create_enquiry(&self, enquiry: &NewEnquiry) -> ApiResult<Enquiry>;
    async fn get_enquiry(&self, id: i64) -> ApiResult<Option<Enquiry>>;
    async fn list_enquiries(
        &self,
        assigned_to: Option<i64>,
        status: Option<EnquiryStatus>,
    ) -> ApiResult<Vec<Enquiry>>;
    /// Writes every mutable column of `enquiry`.
    async fn update_enquiry(&self, enquiry: &Enquiry) -> ApiResult<()>;
    async fn set_enquiry_status(
        &self,
        id: i64,
        status: EnquiryStatus,
        updated_at: &str,
    ) -> ApiResult<()>;
    async fn delete_enquiry(&self, id: i64) -> ApiResult<bool>;
}
