use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::application::services::AuditQuery;
use crate::domain::entities::{AuditEntry, AuditModule};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

pub async fn list_audit_logs(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    let entries = state.audit_service.list(&auth_user, query).await?;
    Ok(Json(entries))
}

pub async fn record_history(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((module, record_id)): Path<(AuditModule, i64)>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    let entries = state
        .audit_service
        .record_history(&auth_user, module, record_id)
        .await?;
    Ok(Json(entries))
}
