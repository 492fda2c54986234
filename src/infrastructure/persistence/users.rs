use crate::domain::entities::{NewUser, User, UserRole};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use crate::shared::utils::to_rfc3339;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const USER_COLUMNS: &str =
    "id, username, email, full_name, role, password_hash, is_active, created_at, updated_at";

fn user_from_row(row: &AnyRow) -> ApiResult<User> {
    let role: String = row.try_get("role")?;
    let is_active: i32 = row.try_get("is_active")?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: nullable(row, "email")?,
        full_name: row.try_get("full_name")?,
        role: role.parse().map_err(ApiError::Internal)?,
        password_hash: row.try_get("password_hash")?,
        is_active: is_active != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for Database {
    async fn create_user(&self, user: &NewUser) -> ApiResult<User> {
        let now = to_rfc3339(chrono::Utc::now());

        let result = sqlx::query(
            "INSERT INTO users (username, email, full_name, role, password_hash, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: inserted_id(&result)?,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            password_hash: user.password_hash.clone(),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn get_user_by_id(&self, id: i64) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self, role_filter: Option<UserRole>) -> ApiResult<Vec<User>> {
        let rows = match role_filter {
            Some(role) => {
                sqlx::query(&format!(
                    "SELECT {} FROM users WHERE role = ? ORDER BY full_name",
                    USER_COLUMNS
                ))
                .bind(role.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {} FROM users ORDER BY full_name", USER_COLUMNS))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(user_from_row).collect()
    }

    async fn list_active_user_ids_by_role(&self, role: UserRole) -> ApiResult<Vec<i64>> {
        let rows = sqlx::query("SELECT id FROM users WHERE role = ? AND is_active = 1 ORDER BY id")
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("id")?);
        }
        Ok(ids)
    }

    async fn set_user_active(&self, id: i64, is_active: bool) -> ApiResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(if is_active { 1 } else { 0 })
            .bind(to_rfc3339(chrono::Utc::now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
