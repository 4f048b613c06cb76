// JWT token generation and validation service

use crate::auth::error::AuthError;
use crate::auth::models::Role;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime: 3 days, no refresh.
const TOKEN_DURATION_SECS: i64 = 259_200;

/// JWT claims structure
///
/// The role is baked in at issuance as the exclusive `isDoctor`/`isPatient`
/// pair. The gateway uses the flags only to pick which identity table to
/// resolve the id against; no other claims are trusted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    #[serde(rename = "isDoctor")]
    pub is_doctor: bool,
    #[serde(rename = "isPatient")]
    pub is_patient: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The role encoded in the flags, if exactly one is set.
    pub fn role(&self) -> Option<Role> {
        match (self.is_doctor, self.is_patient) {
            (true, false) => Some(Role::Doctor),
            (false, true) => Some(Role::Patient),
            _ => None,
        }
    }
}

/// Token service for JWT operations
pub struct TokenService {
    secret: String,
    token_duration: i64, // in seconds
}

impl TokenService {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            token_duration: TOKEN_DURATION_SECS,
        }
    }

    /// Build a service from the process-wide `JWT_SECRET` variable.
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::TokenError("JWT_SECRET not configured".to_string()))?;
        Ok(Self::new(secret))
    }

    /// Issue a signed bearer token for the given identity and role.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = now + self.token_duration;

        let claims = Claims {
            sub: user_id,
            is_doctor: role == Role::Doctor,
            is_patient: role == Role::Patient,
            iat: now,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify a bearer token, rejecting malformed tokens, bad signatures
    /// and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[test]
    fn test_token_expiration_is_3_days() {
        let service = test_token_service();
        let token = service.issue(Uuid::new_v4(), Role::Doctor).unwrap();
        let claims = service.verify(&token).unwrap();

        let duration = claims.exp - claims.iat;
        assert_eq!(duration, 259_200, "Token should expire in exactly 3 days");
    }

    #[test]
    fn test_doctor_token_carries_exclusive_role_flags() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, Role::Doctor).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.is_doctor);
        assert!(!claims.is_patient);
        assert_eq!(claims.role(), Some(Role::Doctor));
    }

    #[test]
    fn test_patient_token_carries_exclusive_role_flags() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, Role::Patient).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(!claims.is_doctor);
        assert!(claims.is_patient);
        assert_eq!(claims.role(), Some(Role::Patient));
    }

    #[test]
    fn test_claims_with_both_or_neither_flag_have_no_role() {
        let both = Claims {
            sub: Uuid::new_v4(),
            is_doctor: true,
            is_patient: true,
            iat: 0,
            exp: 0,
        };
        let neither = Claims {
            sub: Uuid::new_v4(),
            is_doctor: false,
            is_patient: false,
            iat: 0,
            exp: 0,
        };
        assert_eq!(both.role(), None);
        assert_eq!(neither.role(), None);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.verify("").is_err());
        assert!(service.verify("not.a.token").is_err());
        assert!(service.verify("invalid_token_format").is_err());
        assert!(service
            .verify("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1".to_string());
        let service2 = TokenService::new("secret2".to_string());

        let token = service1.issue(Uuid::new_v4(), Role::Patient).unwrap();

        assert!(service1.verify(&token).is_ok());
        assert!(service2.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected_as_expired() {
        let service = test_token_service();

        let claims = Claims {
            sub: Uuid::new_v4(),
            is_doctor: true,
            is_patient: false,
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::ExpiredToken)));
    }

    proptest! {
        #[test]
        fn prop_issued_claims_have_exactly_one_role_flag(doctor in any::<bool>()) {
            let service = test_token_service();
            let role = if doctor { Role::Doctor } else { Role::Patient };
            let token = service.issue(Uuid::new_v4(), role)?;
            let claims = service.verify(&token)?;

            prop_assert_ne!(claims.is_doctor, claims.is_patient);
            prop_assert_eq!(claims.role(), Some(role));
        }

        #[test]
        fn prop_token_round_trips_user_id(bytes in any::<[u8; 16]>()) {
            let service = test_token_service();
            let user_id = Uuid::from_bytes(bytes);
            let token = service.issue(user_id, Role::Patient)?;
            let claims = service.verify(&token)?;

            prop_assert_eq!(claims.sub, user_id);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.verify(&malformed).is_err());
        }
    }
}
