use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Priority, TicketStatus};

/// Resolution deadline per priority, in hours.
pub const SLA_THRESHOLDS: [(Priority, i64); 3] = [
    (Priority::Normal, 24),
    (Priority::Urgent, 6),
    (Priority::Critical, 2),
];

/// Tickets with less than this much time left are in the warning band.
/// Absolute for every priority, so a Critical ticket starts out in it.
pub const SLA_WARNING_WINDOW_HOURS: i64 = 2;

impl Priority {
    pub fn sla_threshold(&self) -> Duration {
        let hours = SLA_THRESHOLDS
            .iter()
            .find(|(priority, _)| priority == self)
            .map(|(_, hours)| *hours)
            .unwrap_or(SLA_THRESHOLDS[0].1);
        Duration::hours(hours)
    }
}

pub fn sla_warning_window() -> Duration {
    Duration::hours(SLA_WARNING_WINDOW_HOURS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaResult {
    Completed,
    /// Time past the deadline.
    Breached(Duration),
    /// Time left before the deadline.
    Warning(Duration),
    /// Time left before the deadline.
    Ok(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaKind {
    Ok,
    Warning,
    Breached,
    Completed,
}

impl SlaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaKind::Ok => "ok",
            SlaKind::Warning => "warning",
            SlaKind::Breached => "breached",
            SlaKind::Completed => "completed",
        }
    }
}

impl std::str::FromStr for SlaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" => Ok(SlaKind::Ok),
            "warning" => Ok(SlaKind::Warning),
            "breached" => Ok(SlaKind::Breached),
            "completed" => Ok(SlaKind::Completed),
            _ => Err(format!("Invalid SLA kind: {}", s)),
        }
    }
}

impl SlaResult {
    pub fn kind(&self) -> SlaKind {
        match self {
            SlaResult::Completed => SlaKind::Completed,
            SlaResult::Breached(_) => SlaKind::Breached,
            SlaResult::Warning(_) => SlaKind::Warning,
            SlaResult::Ok(_) => SlaKind::Ok,
        }
    }

    /// Urgency rank for an open ticket: Ok < Warning < Breached.
    /// Completed ranks below everything.
    pub fn severity(&self) -> u8 {
        match self {
            SlaResult::Completed => 0,
            SlaResult::Ok(_) => 1,
            SlaResult::Warning(_) => 2,
            SlaResult::Breached(_) => 3,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            SlaResult::Completed => None,
            SlaResult::Breached(d) | SlaResult::Warning(d) | SlaResult::Ok(d) => Some(*d),
        }
    }

    pub fn is_breached(&self) -> bool {
        matches!(self, SlaResult::Breached(_))
    }
}

pub fn sla_due_at(priority: Priority, created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + priority.sla_threshold()
}

/// Derive the SLA state of a ticket at `now`. Only `status` stops the clock;
/// the completion stamp does not.
pub fn evaluate_sla(
    priority: Priority,
    created_at: DateTime<Utc>,
    status: TicketStatus,
    _completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SlaResult {
    if status.is_resolved() {
        return SlaResult::Completed;
    }

    let threshold = priority.sla_threshold();
    let elapsed = (now - created_at).max(Duration::zero());

    if elapsed > threshold {
        return SlaResult::Breached(elapsed - threshold);
    }

    let remaining = threshold - elapsed;
    if remaining < sla_warning_window() {
        SlaResult::Warning(remaining)
    } else {
        SlaResult::Ok(remaining)
    }
}

/// Render a duration as `"Xh Ym"`, e.g. `"1h 30m"`.
pub fn format_sla_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    const PRIORITIES: [Priority; 3] = [Priority::Normal, Priority::Urgent, Priority::Critical];

    #[test]
    fn test_thresholds_table() {
        assert_eq!(Priority::Normal.sla_threshold(), Duration::hours(24));
        assert_eq!(Priority::Urgent.sla_threshold(), Duration::hours(6));
        assert_eq!(Priority::Critical.sla_threshold(), Duration::hours(2));
        assert_eq!(SLA_THRESHOLDS.len(), 3);
    }

    #[test]
    fn test_fresh_ticket_has_full_threshold_left() {
        for priority in PRIORITIES {
            let result = evaluate_sla(priority, t0(), TicketStatus::Assigned, None, t0());
            assert_eq!(result.duration(), Some(priority.sla_threshold()));
            assert_ne!(result.kind(), SlaKind::Breached);
        }
        // Normal and Urgent start well outside the warning band
        assert_eq!(
            evaluate_sla(Priority::Normal, t0(), TicketStatus::Assigned, None, t0()),
            SlaResult::Ok(Duration::hours(24))
        );
    }

    #[test]
    fn test_critical_ticket_starts_at_window_edge() {
        // remaining == 2h is not strictly below the window
        assert_eq!(
            evaluate_sla(Priority::Critical, t0(), TicketStatus::Assigned, None, t0()),
            SlaResult::Ok(Duration::hours(2))
        );
        let later = t0() + Duration::seconds(1);
        assert!(matches!(
            evaluate_sla(Priority::Critical, t0(), TicketStatus::Assigned, None, later),
            SlaResult::Warning(_)
        ));
    }

    #[test]
    fn test_one_second_past_deadline_is_breached() {
        for priority in PRIORITIES {
            let now = t0() + priority.sla_threshold() + Duration::seconds(1);
            let result = evaluate_sla(priority, t0(), TicketStatus::InProgress, None, now);
            assert_eq!(result, SlaResult::Breached(Duration::seconds(1)));
        }
    }

    #[test]
    fn test_exactly_at_deadline_is_warning_with_nothing_left() {
        let now = t0() + Duration::hours(24);
        assert_eq!(
            evaluate_sla(Priority::Normal, t0(), TicketStatus::Assigned, None, now),
            SlaResult::Warning(Duration::zero())
        );
    }

    #[test]
    fn test_inside_warning_window() {
        let now = t0() + Duration::hours(24) - Duration::minutes(90);
        assert_eq!(
            evaluate_sla(Priority::Normal, t0(), TicketStatus::Assigned, None, now),
            SlaResult::Warning(Duration::minutes(90))
        );
    }

    #[test]
    fn test_completed_regardless_of_now() {
        let completed_at = Some(t0() + Duration::hours(1));
        for now in [
            t0() - Duration::days(3),
            t0(),
            t0() + Duration::days(30),
        ] {
            for priority in PRIORITIES {
                assert_eq!(
                    evaluate_sla(priority, t0(), TicketStatus::Completed, completed_at, now),
                    SlaResult::Completed
                );
                assert_eq!(
                    evaluate_sla(priority, t0(), TicketStatus::Closed, None, now),
                    SlaResult::Completed
                );
            }
        }
    }

    #[test]
    fn test_ticket_created_in_future_reports_full_threshold() {
        let now = t0() - Duration::hours(5);
        assert_eq!(
            evaluate_sla(Priority::Urgent, t0(), TicketStatus::Assigned, None, now),
            SlaResult::Ok(Duration::hours(6))
        );
    }

    #[test]
    fn test_on_hold_keeps_counting() {
        let now = t0() + Duration::hours(7);
        assert_eq!(
            evaluate_sla(Priority::Urgent, t0(), TicketStatus::OnHold, None, now),
            SlaResult::Breached(Duration::hours(1))
        );
    }

    #[test]
    fn test_open_status_with_completion_stamp_still_runs() {
        let now = t0() + Duration::hours(7);
        let stamped = Some(t0() + Duration::hours(1));
        assert_eq!(
            evaluate_sla(Priority::Urgent, t0(), TicketStatus::InProgress, stamped, now),
            SlaResult::Breached(Duration::hours(1))
        );
    }

    #[test]
    fn test_results_never_move_backwards_as_time_passes() {
        for priority in PRIORITIES {
            let mut previous = 0;
            let mut now = t0() - Duration::hours(1);
            let end = t0() + priority.sla_threshold() + Duration::hours(3);
            while now <= end {
                let severity =
                    evaluate_sla(priority, t0(), TicketStatus::OnTheWay, None, now).severity();
                assert!(severity >= previous, "{:?} regressed at {}", priority, now);
                previous = severity;
                now += Duration::minutes(5);
            }
            assert_eq!(previous, 3);
        }
    }

    #[test]
    fn test_due_at_and_formatting() {
        assert_eq!(
            sla_due_at(Priority::Critical, t0()),
            t0() + Duration::hours(2)
        );
        assert_eq!(format_sla_duration(Duration::minutes(90)), "1h 30m");
        assert_eq!(format_sla_duration(Duration::hours(24)), "24h 0m");
        assert_eq!(format_sla_duration(Duration::seconds(59)), "0h 0m");
    }
}
