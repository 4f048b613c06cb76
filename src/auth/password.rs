// Password hashing and strength validation

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with Argon2id using a fresh random salt.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored hash. The comparison inside
    /// argon2 is constant-time.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Fixed strength policy: at least 8 characters with a lowercase letter,
    /// an uppercase letter, a digit and a symbol.
    pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
        let long_enough = password.chars().count() >= 8;
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol = password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

        if long_enough && has_lower && has_upper && has_digit && has_symbol {
            Ok(())
        } else {
            Err(AuthError::WeakPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = PasswordService::hash_password("Str0ng!Pass").unwrap();
        assert!(PasswordService::verify_password("Str0ng!Pass", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted_and_never_plaintext() {
        let first = PasswordService::hash_password("Str0ng!Pass").unwrap();
        let second = PasswordService::hash_password("Str0ng!Pass").unwrap();

        assert_ne!(first, second, "per-call salts must differ");
        assert!(!first.contains("Str0ng!Pass"));
        assert!(PasswordService::verify_password("Str0ng!Pass", &first).unwrap());
        assert!(PasswordService::verify_password("Str0ng!Pass", &second).unwrap());
    }

    #[test]
    fn test_strength_policy_accepts_mixed_class_passwords() {
        assert!(PasswordService::validate_password_strength("Passw0rd!").is_ok());
        assert!(PasswordService::validate_password_strength("Str0ng!Pass").is_ok());
    }

    #[test]
    fn test_strength_policy_rejects_weak_passwords() {
        // all lowercase
        assert!(PasswordService::validate_password_strength("password").is_err());
        // no symbol
        assert!(PasswordService::validate_password_strength("Passw0rd").is_err());
        // no digit
        assert!(PasswordService::validate_password_strength("Password!").is_err());
        // no uppercase
        assert!(PasswordService::validate_password_strength("passw0rd!").is_err());
        // too short
        assert!(PasswordService::validate_password_strength("P0rd!").is_err());
        // empty
        assert!(PasswordService::validate_password_strength("").is_err());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(PasswordService::verify_password("anything", "not-a-phc-string").is_err());
    }

    proptest! {
        // Hashing is expensive, keep the case count small.
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_verify_accepts_only_the_original_password(
            password in "[A-Za-z0-9!@#]{8,16}",
            other in "[A-Za-z0-9!@#]{8,16}"
        ) {
            let hash = PasswordService::hash_password(&password).unwrap();
            prop_assert!(PasswordService::verify_password(&password, &hash).unwrap());
            if other != password {
                prop_assert!(!PasswordService::verify_password(&other, &hash).unwrap());
            }
        }
    }
}
