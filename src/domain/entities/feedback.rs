use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
/// Ratings at or below this are negative and escalated.
pub const NEGATIVE_RATING_MAX: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub service_request_id: i64,
    pub customer_name: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_negative: bool,
    pub escalated: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub service_request_id: i64,
    pub customer_name: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_negative: bool,
    pub escalated: bool,
    pub created_at: String,
}

/// Feedback joined with the ticket it rates, as shown to the engineer.
#[derive(Debug, Clone, Serialize)]
pub struct EngineerFeedback {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub ticket_no: String,
    pub fault_description: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

pub fn is_negative_rating(rating: i64) -> bool {
    rating <= NEGATIVE_RATING_MAX
}

/// Blend of customer satisfaction (60%) and SLA compliance (40%), 0..=100.
pub fn performance_score(average_rating: f64, sla_compliance_percentage: f64) -> f64 {
    round2(average_rating / MAX_RATING as f64 * 100.0 * 0.6 + sla_compliance_percentage * 0.4)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
