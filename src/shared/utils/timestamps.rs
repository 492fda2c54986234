use chrono::{DateTime, SecondsFormat, Utc};

use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

/// Canonical storage form: second precision, `Z` suffix. Stored values sort
/// lexicographically in time order.
pub fn to_rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_rfc3339(value: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| ApiError::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_form() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap();
        assert_eq!(to_rfc3339(at), "2026-03-14T09:05:00Z");
        assert_eq!(parse_rfc3339("2026-03-14T14:35:00+05:30").unwrap(), at);
        assert!(parse_rfc3339("yesterday").is_err());
    }
}
