use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::sla::{evaluate_sla, SlaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Normal,
    Urgent,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "NORMAL",
            Priority::Urgent => "URGENT",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NORMAL" => Ok(Priority::Normal),
            "URGENT" => Ok(Priority::Urgent),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Assigned,
    OnTheWay,
    InProgress,
    OnHold,
    Completed,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 6] = [
        TicketStatus::Assigned,
        TicketStatus::OnTheWay,
        TicketStatus::InProgress,
        TicketStatus::OnHold,
        TicketStatus::Completed,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Assigned => "ASSIGNED",
            TicketStatus::OnTheWay => "ON_THE_WAY",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::OnHold => "ON_HOLD",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::Closed => "CLOSED",
        }
    }

    /// Resolved tickets no longer run an SLA clock.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Closed)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ASSIGNED" => Ok(TicketStatus::Assigned),
            "ON_THE_WAY" => Ok(TicketStatus::OnTheWay),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "ON_HOLD" => Ok(TicketStatus::OnHold),
            "COMPLETED" => Ok(TicketStatus::Completed),
            "CLOSED" => Ok(TicketStatus::Closed),
            _ => Err(format!("Invalid ticket status: {}", s)),
        }
    }
}

/// A printer service ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub ticket_no: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub machine_model: Option<String>,
    pub fault_description: Option<String>,
    pub priority: Priority,
    pub status: TicketStatus,
    pub assigned_to: Option<i64>,
    pub sla_warning_sent: bool,
    pub sla_breach_sent: bool,
    pub resolution_notes: Option<String>,
    pub parts_replaced: Option<String>,
    pub feedback_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    pub fn sla(&self, now: DateTime<Utc>) -> SlaResult {
        evaluate_sla(
            self.priority,
            self.created_at,
            self.status,
            self.completed_at,
            now,
        )
    }

    pub fn is_assigned_to(&self, user_id: i64) -> bool {
        self.assigned_to == Some(user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub ticket_no: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub machine_model: Option<String>,
    pub fault_description: Option<String>,
    pub priority: Priority,
    pub assigned_to: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Ticket numbers look like `SR20260314A1B2C3`.
pub fn generate_ticket_no(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("SR{}{}", now.format("%Y%m%d"), suffix)
}

/// Storage-level filter. `limit: None` returns every matching row.
#[derive(Debug, Clone, Default)]
pub struct ServiceRequestFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<i64>,
    pub limit: Option<i64>,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn test_status_parsing_matches_storage_form() {
        for status in TicketStatus::ALL {
            assert_eq!(TicketStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(TicketStatus::from_str("NEW").is_err());
    }

    #[test]
    fn test_ticket_number_shape() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
        let ticket_no = generate_ticket_no(now);
        assert!(ticket_no.starts_with("SR20260314"));
        assert_eq!(ticket_no.len(), 16);
        assert!(ticket_no[10..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
