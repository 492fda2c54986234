use crate::domain::entities::{Attendance, NewAttendance};
use crate::domain::ports::attendance_repository::AttendanceRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use crate::shared::utils::to_rfc3339;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{any::AnyRow, Row};

const ATTENDANCE_COLUMNS: &str =
    "id, user_id, attendance_date, check_in_at, status, location, latitude, longitude, photo_url";

fn attendance_from_row(row: &AnyRow) -> ApiResult<Attendance> {
    let status: String = row.try_get("status")?;

    Ok(Attendance {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        attendance_date: row.try_get("attendance_date")?,
        check_in_at: row.try_get("check_in_at")?,
        status: status.parse().map_err(ApiError::Internal)?,
        location: nullable(row, "location")?,
        latitude: nullable(row, "latitude")?,
        longitude: nullable(row, "longitude")?,
        photo_url: row.try_get("photo_url")?,
    })
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl AttendanceRepository for Database {
    async fn create_attendance(&self, attendance: &NewAttendance) -> ApiResult<Attendance> {
        let attendance_date = date_key(attendance.attendance_date);
        let check_in_at = to_rfc3339(attendance.check_in_at);

        let result = sqlx::query(
            "INSERT INTO attendance (
                user_id, attendance_date, check_in_at, status, location, latitude, longitude,
                photo_url
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(attendance.user_id)
        .bind(&attendance_date)
        .bind(&check_in_at)
        .bind(attendance.status.as_str())
        .bind(&attendance.location)
        .bind(attendance.latitude)
        .bind(attendance.longitude)
        .bind(&attendance.photo_url)
        .execute(&self.pool)
        .await?;

        Ok(Attendance {
            id: inserted_id(&result)?,
            user_id: attendance.user_id,
            attendance_date,
            check_in_at,
            status: attendance.status,
            location: attendance.location.clone(),
            latitude: attendance.latitude,
            longitude: attendance.longitude,
            photo_url: attendance.photo_url.clone(),
        })
    }

    async fn get_attendance_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> ApiResult<Option<Attendance>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM attendance WHERE user_id = ? AND attendance_date = ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(user_id)
        .bind(date_key(date))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(attendance_from_row).transpose()
    }

    async fn list_user_attendance(&self, user_id: i64, limit: i64) -> ApiResult<Vec<Attendance>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM attendance WHERE user_id = ?
             ORDER BY attendance_date DESC LIMIT ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attendance_from_row).collect()
    }

    async fn list_attendance_for_date(&self, date: NaiveDate) -> ApiResult<Vec<Attendance>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM attendance WHERE attendance_date = ? ORDER BY check_in_at ASC",
            ATTENDANCE_COLUMNS
        ))
        .bind(date_key(date))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attendance_from_row).collect()
    }
}
