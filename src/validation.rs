//! Field validation helpers
//!
//! Format checks shared by the request DTOs.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?1?\d{10,15}$").unwrap());

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Validate a phone number. Spaces and dashes are ignored; what remains
/// must be 10-15 digits with an optional leading "+" and country code.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let normalized: String = phone.replace([' ', '-'], "");

    if PHONE_RE.is_match(&normalized) {
        return Ok(());
    }

    let mut err = ValidationError::new("invalid_phone");
    err.message = Some("Invalid phone number format".into());
    Err(err)
}

/// Pull a year count out of free-form experience text like "10 years".
/// Returns `None` when the text carries no digits.
pub fn parse_experience(text: &str) -> Option<u32> {
    DIGITS_RE
        .find(text)
        .and_then(|digits| digits.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_phone_formats() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+19876543210").is_ok());
        assert!(validate_phone("987-654-3210").is_ok());
        assert!(validate_phone("987 654 3210").is_ok());
    }

    #[test]
    fn rejects_short_and_non_numeric_phones() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("not-a-phone").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn extracts_first_digit_run_from_experience_text() {
        assert_eq!(parse_experience("10 years"), Some(10));
        assert_eq!(parse_experience("about 7 yrs, 3 abroad"), Some(7));
        assert_eq!(parse_experience("senior"), None);
        assert_eq!(parse_experience(""), None);
    }
}
