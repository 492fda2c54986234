use crate::domain::entities::{AuditEntry, AuditFilter, AuditModule, NewAuditEntry};
use crate::domain::ports::audit_repository::AuditRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const AUDIT_COLUMNS: &str =
    "id, user_id, username, action, module, record_id, changes, created_at";

fn audit_entry_from_row(row: &AnyRow) -> ApiResult<AuditEntry> {
    let action: String = row.try_get("action")?;
    let module: String = row.try_get("module")?;
    let changes: Option<String> = nullable(row, "changes")?;

    Ok(AuditEntry {
        id: row.try_get("id")?,
        user_id: nullable(row, "user_id")?,
        username: row.try_get("username")?,
        action: action.parse().map_err(ApiError::Internal)?,
        module: module.parse().map_err(ApiError::Internal)?,
        record_id: row.try_get("record_id")?,
        changes: changes
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| ApiError::Internal(format!("Corrupt audit changes: {}", e)))?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl AuditRepository for Database {
    async fn create_audit_entry(&self, entry: &NewAuditEntry) -> ApiResult<AuditEntry> {
        let changes = entry.changes.as_ref().map(|c| c.to_string());

        let result = sqlx::query(
            "INSERT INTO audit_logs (user_id, username, action, module, record_id, changes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(entry.action.as_str())
        .bind(entry.module.as_str())
        .bind(entry.record_id)
        .bind(changes)
        .bind(&entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(AuditEntry {
            id: inserted_id(&result)?,
            user_id: entry.user_id,
            username: entry.username.clone(),
            action: entry.action,
            module: entry.module,
            record_id: entry.record_id,
            changes: entry.changes.clone(),
            created_at: entry.created_at.clone(),
        })
    }

    async fn list_audit_entries(&self, filter: &AuditFilter) -> ApiResult<Vec<AuditEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM audit_logs
             WHERE (? IS NULL OR module = ?)
               AND (? IS NULL OR user_id = ?)
               AND (? IS NULL OR action = ?)
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
            AUDIT_COLUMNS
        ))
        .bind(filter.module.map(|m| m.as_str()))
        .bind(filter.module.map(|m| m.as_str()))
        .bind(filter.user_id)
        .bind(filter.user_id)
        .bind(filter.action.map(|a| a.as_str()))
        .bind(filter.action.map(|a| a.as_str()))
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(audit_entry_from_row).collect()
    }

    async fn list_record_history(
        &self,
        module: AuditModule,
        record_id: i64,
    ) -> ApiResult<Vec<AuditEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM audit_logs
             WHERE module = ? AND record_id = ?
             ORDER BY created_at ASC, id ASC",
            AUDIT_COLUMNS
        ))
        .bind(module.as_str())
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(audit_entry_from_row).collect()
    }
}
