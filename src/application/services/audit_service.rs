use std::sync::Arc;

use serde::Deserialize;
use tracing::error;

use crate::domain::entities::{AuditAction, AuditEntry, AuditFilter, AuditModule, NewAuditEntry};
use crate::domain::ports::{audit_repository::AuditRepository, time_service::Clock};
use crate::domain::services::Capability;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};
use crate::shared::utils::to_rfc3339;

pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
pub const MAX_AUDIT_LIMIT: i64 = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub module: Option<AuditModule>,
    pub user_id: Option<i64>,
    pub action: Option<AuditAction>,
    pub limit: Option<i64>,
}

/// Trail of status, assignment and order decisions. Recording never fails
/// the calling operation.
#[derive(Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn record(
        &self,
        actor: &AuthenticatedUser,
        action: AuditAction,
        module: AuditModule,
        record_id: i64,
        changes: Option<serde_json::Value>,
    ) {
        let entry = NewAuditEntry {
            user_id: Some(actor.id()),
            username: actor.user.username.clone(),
            action,
            module,
            record_id,
            changes,
            created_at: to_rfc3339(self.clock.now()),
        };

        if let Err(e) = self.repo.create_audit_entry(&entry).await {
            error!(
                "Failed to record {} on {} {}: {}",
                action.as_str(),
                module,
                record_id,
                e
            );
        }
    }

    pub async fn list(
        &self,
        auth_user: &AuthenticatedUser,
        query: AuditQuery,
    ) -> ApiResult<Vec<AuditEntry>> {
        auth_user.require(Capability::AuditView)?;

        let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
        if !(1..=MAX_AUDIT_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_AUDIT_LIMIT
            )));
        }

        self.repo
            .list_audit_entries(&AuditFilter {
                module: query.module,
                user_id: query.user_id,
                action: query.action,
                limit,
            })
            .await
    }

    pub async fn record_history(
        &self,
        auth_user: &AuthenticatedUser,
        module: AuditModule,
        record_id: i64,
    ) -> ApiResult<Vec<AuditEntry>> {
        auth_user.require(Capability::AuditView)?;
        self.repo.list_record_history(module, record_id).await
    }
}
