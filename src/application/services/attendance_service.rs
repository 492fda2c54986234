use std::sync::Arc;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{
    business_date, classify_check_in, Attendance, AttendanceStatus, NewAttendance,
    NotificationDraft, NotificationPriority, NotificationType, UserRole,
};
use crate::domain::ports::{attendance_repository::AttendanceRepository, time_service::Clock};
use crate::domain::services::Capability;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AuthenticatedUser};

use super::NotificationService;

pub const DEFAULT_HISTORY_LIMIT: i64 = 30;
pub const MAX_HISTORY_LIMIT: i64 = 366;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInRequest {
    pub photo_url: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TodayAttendance {
    pub checked_in: bool,
    pub attendance: Option<Attendance>,
}

#[derive(Clone)]
pub struct AttendanceService {
    repo: Arc<dyn AttendanceRepository>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl AttendanceService {
    pub fn new(
        repo: Arc<dyn AttendanceRepository>,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        Self {
            repo,
            notifications,
            clock,
            timezone,
        }
    }

    /// One check-in per business day. A second attempt is a conflict.
    pub async fn check_in(
        &self,
        auth_user: &AuthenticatedUser,
        request: CheckInRequest,
    ) -> ApiResult<Attendance> {
        let photo_url = request.photo_url.trim().to_string();
        if photo_url.is_empty() {
            return Err(ApiError::BadRequest(
                "A check-in photo is required".to_string(),
            ));
        }
        if request.latitude.map_or(false, |lat| !(-90.0..=90.0).contains(&lat))
            || request.longitude.map_or(false, |lon| !(-180.0..=180.0).contains(&lon))
        {
            return Err(ApiError::BadRequest("Invalid coordinates".to_string()));
        }

        let now = self.clock.now();
        let (attendance_date, status) = classify_check_in(now, self.timezone);

        if self
            .repo
            .get_attendance_for_date(auth_user.id(), attendance_date)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("Already checked in today".to_string()));
        }

        let attendance = self
            .repo
            .create_attendance(&NewAttendance {
                user_id: auth_user.id(),
                attendance_date,
                check_in_at: now,
                status,
                location: request
                    .location
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty()),
                latitude: request.latitude,
                longitude: request.longitude,
                photo_url,
            })
            .await?;

        info!(
            "User {} checked in for {} ({})",
            auth_user.user.username,
            attendance.attendance_date,
            status.as_str()
        );

        if status == AttendanceStatus::Late {
            let local = now.with_timezone(&self.timezone);
            let draft = NotificationDraft::new(
                NotificationType::LateAttendance,
                format!("Late Attendance: {}", auth_user.user.full_name),
                format!(
                    "Checked in at {} (after 9:30 AM cutoff)",
                    local.format("%I:%M %p")
                ),
            )
            .with_priority(NotificationPriority::Normal)
            .with_action_url("/admin/attendance");
            self.notifications
                .notify_roles(&[UserRole::Admin], None, &draft)
                .await;
        }

        Ok(attendance)
    }

    pub async fn today(&self, auth_user: &AuthenticatedUser) -> ApiResult<TodayAttendance> {
        let today = business_date(self.clock.now(), self.timezone);
        let attendance = self
            .repo
            .get_attendance_for_date(auth_user.id(), today)
            .await?;

        Ok(TodayAttendance {
            checked_in: attendance.is_some(),
            attendance,
        })
    }

    pub async fn has_checked_in_today(&self, user_id: i64) -> ApiResult<bool> {
        let today = business_date(self.clock.now(), self.timezone);
        Ok(self
            .repo
            .get_attendance_for_date(user_id, today)
            .await?
            .is_some())
    }

    pub async fn my_history(
        &self,
        auth_user: &AuthenticatedUser,
        limit: Option<i64>,
    ) -> ApiResult<Vec<Attendance>> {
        let limit = history_limit(limit)?;
        self.repo.list_user_attendance(auth_user.id(), limit).await
    }

    pub async fn employee_history(
        &self,
        auth_user: &AuthenticatedUser,
        user_id: i64,
        limit: Option<i64>,
    ) -> ApiResult<Vec<Attendance>> {
        if user_id != auth_user.id() {
            auth_user.require(Capability::AttendanceViewAll)?;
        }
        let limit = history_limit(limit)?;
        self.repo.list_user_attendance(user_id, limit).await
    }

    pub async fn all_today(&self, auth_user: &AuthenticatedUser) -> ApiResult<Vec<Attendance>> {
        auth_user.require(Capability::AttendanceViewAll)?;

        let today = business_date(self.clock.now(), self.timezone);
        self.repo.list_attendance_for_date(today).await
    }
}

fn history_limit(limit: Option<i64>) -> ApiResult<i64> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }
    Ok(limit)
}
