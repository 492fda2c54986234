use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    OnTime,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::OnTime => "ON_TIME",
            AttendanceStatus::Late => "LATE",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ON_TIME" => Ok(AttendanceStatus::OnTime),
            "LATE" => Ok(AttendanceStatus::Late),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub user_id: i64,
    /// Business date in the configured business timezone, `YYYY-MM-DD`.
    pub attendance_date: String,
    pub check_in_at: String,
    pub status: AttendanceStatus,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: String,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: i64,
    pub attendance_date: NaiveDate,
    pub check_in_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: String,
}

/// Check-ins strictly after 09:30 local time are late.
pub const LATE_CUTOFF_HOUR: u32 = 9;
pub const LATE_CUTOFF_MINUTE: u32 = 30;

/// Business day and punctuality of a check-in instant.
pub fn classify_check_in(at: DateTime<Utc>, tz: Tz) -> (NaiveDate, AttendanceStatus) {
    let local = tz.from_utc_datetime(&at.naive_utc());
    let cutoff = NaiveTime::from_hms_opt(LATE_CUTOFF_HOUR, LATE_CUTOFF_MINUTE, 0)
        .unwrap_or(NaiveTime::MIN);
    let status = if local.time() > cutoff {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::OnTime
    };
    (local.date_naive(), status)
}

pub fn business_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    tz.from_utc_datetime(&at.naive_utc()).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_before_cutoff_is_on_time() {
        // 03:30 UTC is 09:00 in Kolkata
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 3, 30, 0).unwrap();
        let (date, status) = classify_check_in(at, chrono_tz::Asia::Kolkata);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        assert_eq!(status, AttendanceStatus::OnTime);
    }

    #[test]
    fn test_check_in_exactly_at_cutoff_is_on_time() {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 4, 0, 0).unwrap();
        let (_, status) = classify_check_in(at, chrono_tz::Asia::Kolkata);
        assert_eq!(status, AttendanceStatus::OnTime);
    }

    #[test]
    fn test_check_in_after_cutoff_is_late() {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 4, 1, 0).unwrap();
        let (_, status) = classify_check_in(at, chrono_tz::Asia::Kolkata);
        assert_eq!(status, AttendanceStatus::Late);
    }

    #[test]
    fn test_business_date_rolls_over_in_local_time() {
        // 20:00 UTC on the 4th is already the 5th in Kolkata
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 20, 0, 0).unwrap();
        assert_eq!(
            business_date(at, chrono_tz::Asia::Kolkata),
            NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()
        );
    }
}
