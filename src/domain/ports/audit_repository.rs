use crate::domain::entities::{AuditEntry, AuditFilter, AuditModule, NewAuditEntry};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create_audit_entry(&self, entry: &NewAuditEntry) -> ApiResult<AuditEntry>;
    /// Newest first, at most `filter.limit` rows.
    async fn list_audit_entries(&self, filter: &AuditFilter) -> ApiResult<Vec<AuditEntry>>;
    /// Oldest first.
    async fn list_record_history(
        &self,
        module: AuditModule,
        record_id: i64,
    ) -> ApiResult<Vec<AuditEntry>>;
}
