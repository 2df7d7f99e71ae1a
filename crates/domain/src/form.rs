//! Trimming and validation helpers shared by editor forms.

use keel_core::{AppError, AppResult, NonEmptyString};

/// Returns the value with surrounding whitespace removed.
#[must_use]
pub fn trimmed(value: &str) -> String {
    value.trim().to_owned()
}

/// Returns the trimmed value, or `None` when it is blank.
#[must_use]
pub fn optional_trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Returns the trimmed value of a required field.
pub fn required(field: &str, value: &str) -> AppResult<String> {
    NonEmptyString::new(value.trim())
        .map(String::from)
        .map_err(|_| AppError::Validation(format!("{field} is required")))
}

/// Checks that a trimmed value has between `min` and `max` characters.
pub fn bounded_length(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let length = value.trim().chars().count();
    if length < min || length > max {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }

    Ok(())
}

/// Checks that an optional value does not exceed `max` characters.
pub fn max_length(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {max} characters"
        )));
    }

    Ok(())
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// Performs basic structural validation: exactly one `@`, non-empty local
/// part, and a domain containing at least one `.`.
pub fn email_address(value: &str) -> AppResult<String> {
    let normalized = value.trim().to_lowercase();

    let Some((local, domain)) = normalized.split_once('@') else {
        return Err(AppError::Validation(
            "email address must contain exactly one '@'".to_owned(),
        ));
    };

    if local.is_empty() {
        return Err(AppError::Validation(
            "email local part must not be empty".to_owned(),
        ));
    }

    if domain.contains('@') {
        return Err(AppError::Validation(
            "email address must contain exactly one '@'".to_owned(),
        ));
    }

    if domain.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation(
            "email domain must contain at least one '.'".to_owned(),
        ));
    }

    if normalized.len() > 254 {
        return Err(AppError::Validation(
            "email address must not exceed 254 characters".to_owned(),
        ));
    }

    Ok(normalized)
}

/// Validates a mobile number made of 6 to 20 digits, `+` allowed first.
pub fn phone_number(value: &str) -> AppResult<String> {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    let digit_count = digits.chars().count();

    if !(6..=20).contains(&digit_count) || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(AppError::Validation(format!(
            "phone number '{value}' must contain 6 to 20 digits"
        )));
    }

    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  ops  ").unwrap_or_default(), "ops");
        assert!(matches!(
            required("name", "   "),
            Err(AppError::Validation(message)) if message == "name is required"
        ));
    }

    #[test]
    fn optional_trimmed_drops_blank() {
        assert_eq!(optional_trimmed("  "), None);
        assert_eq!(optional_trimmed(" a "), Some("a".to_owned()));
    }

    #[test]
    fn valid_email_is_normalized() {
        assert_eq!(
            email_address(" USER@Example.COM ").unwrap_or_default(),
            "user@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(email_address("noatsign").is_err());
        assert!(email_address("user@nodot").is_err());
        assert!(email_address("a@b@c.com").is_err());
        assert!(email_address("@example.com").is_err());
    }

    #[test]
    fn phone_numbers_require_digits() {
        assert!(phone_number("+15551234567").is_ok());
        assert!(phone_number("12ab34").is_err());
        assert!(phone_number("123").is_err());
    }

    #[test]
    fn length_bounds_count_characters() {
        assert!(bounded_length("user name", "ab", 2, 20).is_ok());
        assert!(bounded_length("user name", "a", 2, 20).is_err());
        assert!(max_length("remark", "ééé", 3).is_ok());
    }
}
