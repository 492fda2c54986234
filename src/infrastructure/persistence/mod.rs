use sqlx::{
    any::{AnyConnectOptions, AnyPoolOptions, AnyQueryResult, AnyRow},
    Any, AnyPool, ConnectOptions, Decode, Row, Type, TypeInfo, ValueRef,
};
use std::str::FromStr;
use tracing::log::LevelFilter;

use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

mod attendance;
mod audit;
mod enquiries;
mod feedback;
mod notifications;
mod orders;
mod service_requests;
mod sessions;
mod users;

/// Shared connection pool. Implements every repository port.
pub struct Database {
    pub(crate) pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();

        let mut connect_options = AnyConnectOptions::from_str(database_url)?;

        // Statement logging; slow queries surface at warn
        connect_options = connect_options
            .log_statements(LevelFilter::Info)
            .log_slow_statements(LevelFilter::Warn, std::time::Duration::from_secs(1));

        let pool = AnyPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .connect_with(connect_options)
            .await?;

        // Enable optimizations for SQLite
        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA busy_timeout = 5000")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous = NORMAL")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

/// Reads a nullable column. The Any driver tags SQL NULL with its own type
/// and never reports it through `is_null`, so `Option<T>` cannot be decoded
/// directly.
pub(crate) fn nullable<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: Decode<'r, Any> + Type<Any>,
{
    if row.try_get_raw(column)?.type_info().name() == "NULL" {
        return Ok(None);
    }
    row.try_get(column).map(Some)
}

/// Row id assigned by an INSERT run through `execute`.
pub(crate) fn inserted_id(result: &AnyQueryResult) -> ApiResult<i64> {
    result
        .last_insert_id()
        .ok_or_else(|| ApiError::Internal("Insert did not report a row id".to_string()))
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}
