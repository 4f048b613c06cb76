// Input validation helpers for the account flows

use crate::auth::error::AuthError;

/// Require a field to be present and non-empty. Checked before anything
/// else so the "All fields must be filled." error always fires first.
pub fn require(field: &Option<String>) -> Result<&str, AuthError> {
    match field.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AuthError::MissingFields),
    }
}

/// Validate email syntax
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_empty_fields() {
        assert!(require(&None).is_err());
        assert!(require(&Some(String::new())).is_err());
        assert!(require(&Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_require_passes_through_present_values() {
        assert_eq!(require(&Some("Dr A".to_string())).unwrap(), "Dr A");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("user.name+tag@example.co.uk").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld@twice.com").is_err());
        assert!(validate_email("").is_err());
    }
}
