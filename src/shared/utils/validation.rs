use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

pub fn validate_and_normalize_email(email: &str) -> ApiResult<String> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(ApiError::BadRequest(
            "Invalid email format. Must be in format user@domain.tld".to_string(),
        ));
    }

    // email_address accepts dotless domains
    let has_tld = trimmed
        .rsplit_once('@')
        .map_or(false, |(_, domain)| domain.contains('.'));
    if !has_tld {
        return Err(ApiError::BadRequest(
            "Invalid email format. Domain must include a TLD (e.g., .com, .in)".to_string(),
        ));
    }

    Ok(trimmed.to_lowercase())
}

/// Blank strings count as absent.
pub fn normalize_optional_email(email: Option<String>) -> ApiResult<Option<String>> {
    match email.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => validate_and_normalize_email(value).map(Some),
    }
}

pub const MIN_PHONE_DIGITS: usize = 10;

/// Strips formatting from a phone number, keeping digits and a leading `+`.
pub fn normalize_phone(phone: &str) -> ApiResult<String> {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ApiError::BadRequest(format!(
            "Phone number must have at least {} digits",
            MIN_PHONE_DIGITS
        )));
    }

    if trimmed.starts_with('+') {
        Ok(format!("+{}", digits))
    } else {
        Ok(digits)
    }
}

pub fn normalize_optional_phone(phone: Option<String>) -> ApiResult<Option<String>> {
    match phone.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => normalize_phone(value).map(Some),
    }
}

/// Trims a free-text field. Blank strings count as absent.
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn require_non_empty(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
