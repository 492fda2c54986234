use chrono::NaiveDate;

use crate::domain::entities::{Attendance, NewAttendance};
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn create_attendance(&self, attendance: &NewAttendance) -> ApiResult<Attendance>;
    async fn get_attendance_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> ApiResult<Option<Attendance>>;
    /// Most recent first.
    async fn list_user_attendance(&self, user_id: i64, limit: i64) -> ApiResult<Vec<Attendance>>;
    async fn list_attendance_for_date(&self, date: NaiveDate) -> ApiResult<Vec<Attendance>>;
}
