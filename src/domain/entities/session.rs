use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
    pub last_accessed_at: String,
}

impl Session {
    pub fn new(user_id: i64, token: String, duration_hours: i64) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let expires_at = now + time::Duration::hours(duration_hours);
        let now_str = format_rfc3339(now);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            token,
            expires_at: format_rfc3339(expires_at),
            created_at: now_str.clone(),
            last_accessed_at: now_str,
        }
    }

    /// Unparseable expiry timestamps count as expired.
    pub fn is_expired(&self) -> bool {
        match time::OffsetDateTime::parse(
            &self.expires_at,
            &time::format_description::well_known::Rfc3339,
        ) {
            Ok(expires_at) => expires_at < time::OffsetDateTime::now_utc(),
            Err(_) => true,
        }
    }
}

fn format_rfc3339(at: time::OffsetDateTime) -> String {
    // Rfc3339 formatting only fails for years outside 0..=9999
    at.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
