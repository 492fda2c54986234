use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnquiryPriority {
    Hot,
    Warm,
    Cold,
}

impl EnquiryPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnquiryPriority::Hot => "HOT",
            EnquiryPriority::Warm => "WARM",
            EnquiryPriority::Cold => "COLD",
        }
    }
}

impl Default for EnquiryPriority {
    fn default() -> Self {
        EnquiryPriority::Warm
    }
}

impl std::str::FromStr for EnquiryPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOT" => Ok(EnquiryPriority::Hot),
            "WARM" => Ok(EnquiryPriority::Warm),
            "COLD" => Ok(EnquiryPriority::Cold),
            _ => Err(format!("Invalid enquiry priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnquiryStatus {
    New,
    Contacted,
    FollowUp,
    Converted,
    Lost,
}

impl EnquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnquiryStatus::New => "NEW",
            EnquiryStatus::Contacted => "CONTACTED",
            EnquiryStatus::FollowUp => "FOLLOW_UP",
            EnquiryStatus::Converted => "CONVERTED",
            EnquiryStatus::Lost => "LOST",
        }
    }
}

impl std::str::FromStr for EnquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NEW" => Ok(EnquiryStatus::New),
            "CONTACTED" => Ok(EnquiryStatus::Contacted),
            "FOLLOW_UP" => Ok(EnquiryStatus::FollowUp),
            "CONVERTED" => Ok(EnquiryStatus::Converted),
            "LOST" => Ok(EnquiryStatus::Lost),
            _ => Err(format!("Invalid enquiry status: {}", s)),
        }
    }
}

/// A sales lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: i64,
    pub enquiry_no: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub product_interest: Option<String>,
    pub priority: EnquiryPriority,
    pub status: EnquiryStatus,
    pub source: String,
    pub assigned_to: Option<i64>,
    pub next_follow_up: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub enquiry_no: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub product_interest: Option<String>,
    pub priority: EnquiryPriority,
    pub source: String,
    pub assigned_to: Option<i64>,
    pub next_follow_up: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
}

/// Partial update. `assigned_to: Some(None)` clears the assignee.
#[derive(Debug, Clone, Default)]
pub struct EnquiryChanges {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub product_interest: Option<String>,
    pub priority: Option<EnquiryPriority>,
    pub status: Option<EnquiryStatus>,
    pub assigned_to: Option<Option<i64>>,
    pub next_follow_up: Option<String>,
    pub notes: Option<String>,
}

impl EnquiryChanges {
    /// Apply the changes in place. Returns the new assignee when the
    /// assignment actually changed.
    pub fn apply_to(self, enquiry: &mut Enquiry) -> Option<i64> {
        let previous_assignee = enquiry.assigned_to;

        if let Some(customer_name) = self.customer_name {
            enquiry.customer_name = customer_name;
        }
        if let Some(phone) = self.phone {
            enquiry.phone = Some(phone);
        }
        if let Some(email) = self.email {
            enquiry.email = Some(email);
        }
        if let Some(product_interest) = self.product_interest {
            enquiry.product_interest = Some(product_interest);
        }
        if let Some(priority) = self.priority {
            enquiry.priority = priority;
        }
        if let Some(status) = self.status {
            enquiry.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            enquiry.assigned_to = assigned_to;
        }
        if let Some(next_follow_up) = self.next_follow_up {
            enquiry.next_follow_up = Some(next_follow_up);
        }
        if let Some(notes) = self.notes {
            enquiry.notes = Some(notes);
        }

        match enquiry.assigned_to {
            Some(assignee) if enquiry.assigned_to != previous_assignee => Some(assignee),
            _ => None,
        }
    }
}

pub fn generate_enquiry_no(now: chrono::DateTime<chrono::Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("ENQ{}{}", now.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enquiry() -> Enquiry {
        Enquiry {
            id: 1,
            enquiry_no: "ENQ20260101ABCDEF".to_string(),
            customer_name: "Ravi Kumar".to_string(),
            phone: Some("9876543210".to_string()),
            email: None,
            product_interest: Some("Laser printer".to_string()),
            priority: EnquiryPriority::Warm,
            status: EnquiryStatus::New,
            source: "website".to_string(),
            assigned_to: Some(4),
            next_follow_up: None,
            notes: None,
            created_by: "reception".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_apply_reports_new_assignee() {
        let mut target = enquiry();
        let changes = EnquiryChanges {
            assigned_to: Some(Some(7)),
            status: Some(EnquiryStatus::Contacted),
            ..Default::default()
        };
        assert_eq!(changes.apply_to(&mut target), Some(7));
        assert_eq!(target.status, EnquiryStatus::Contacted);
    }

    #[test]
    fn test_apply_same_assignee_is_not_a_reassignment() {
        let mut target = enquiry();
        let changes = EnquiryChanges {
            assigned_to: Some(Some(4)),
            ..Default::default()
        };
        assert_eq!(changes.apply_to(&mut target), None);
    }

    #[test]
    fn test_apply_can_clear_assignee() {
        let mut target = enquiry();
        let changes = EnquiryChanges {
            assigned_to: Some(None),
            ..Default::default()
        };
        assert_eq!(changes.apply_to(&mut target), None);
        assert_eq!(target.assigned_to, None);
    }

    #[test]
    fn test_status_parsing() {
        use std::str::FromStr;
        assert_eq!(
            EnquiryStatus::from_str("follow_up").unwrap(),
            EnquiryStatus::FollowUp
        );
        assert!(EnquiryPriority::from_str("lukewarm").is_err());
    }
}
