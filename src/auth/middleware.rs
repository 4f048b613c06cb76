// Auth gateway: extractors that turn a bearer token into a resolved identity
//
// Three guard variants, one per route class:
//   AuthUser    - any authenticated identity, resolved from the table the
//                 token's role flags point at
//   AuthDoctor  - doctor routes; any token with the patient flag is rejected
//                 before the database is touched
//   AuthPatient - mirror image for patient routes
//
// Every failure collapses to the same 401 "Not Authorized." body. A token
// whose role flags resolve to no stored identity is rejected outright.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    models::{Doctor, Identity, Patient},
    repository::{DoctorRepository, PatientRepository},
    token::{Claims, TokenService},
};

/// Any authenticated identity (doctor or patient)
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// An authenticated doctor
#[derive(Debug, Clone)]
pub struct AuthDoctor(pub Doctor);

/// An authenticated patient
#[derive(Debug, Clone)]
pub struct AuthPatient(pub Patient);

/// Pull the token out of the `Authorization: Bearer <token>` header.
pub(crate) fn extract_bearer(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

/// Verify the bearer token carried by the request and return its claims.
fn verify_request_token(parts: &Parts) -> Result<Claims, AuthError> {
    let token = extract_bearer(parts)?;
    let token_service = TokenService::from_env()?;
    token_service.verify(token)
}

/// Doctor-route gate. The patient flag rejects unconditionally, even if the
/// doctor flag were somehow also set.
pub(crate) fn gate_doctor_claims(claims: &Claims) -> Result<(), AuthError> {
    if claims.is_patient {
        return Err(AuthError::WrongRole);
    }
    if !claims.is_doctor {
        return Err(AuthError::UnknownIdentity);
    }
    Ok(())
}

/// Patient-route gate, mirror of `gate_doctor_claims`.
pub(crate) fn gate_patient_claims(claims: &Claims) -> Result<(), AuthError> {
    if claims.is_doctor {
        return Err(AuthError::WrongRole);
    }
    if !claims.is_patient {
        return Err(AuthError::UnknownIdentity);
    }
    Ok(())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    PgPool: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = verify_request_token(parts)?;
        let pool = PgPool::from_ref(state);

        // The role flags only route the lookup; the authoritative role is
        // which table actually holds the id.
        let identity = if claims.is_doctor {
            DoctorRepository::new(pool)
                .find_by_id(claims.sub)
                .await?
                .map(Identity::Doctor)
        } else if claims.is_patient {
            PatientRepository::new(pool)
                .find_by_id(claims.sub)
                .await?
                .map(Identity::Patient)
        } else {
            warn!("Token {} carries no role flag", claims.sub);
            None
        };

        let identity = identity.ok_or(AuthError::UnknownIdentity)?;
        debug!("Authenticated {:?} {}", identity.role(), identity.id());
        Ok(AuthUser(identity))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthDoctor
where
    S: Send + Sync,
    PgPool: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = verify_request_token(parts)?;
        gate_doctor_claims(&claims)?;

        let pool = PgPool::from_ref(state);
        let doctor = DoctorRepository::new(pool)
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownIdentity)?;

        debug!("Authenticated doctor {}", doctor.id);
        Ok(AuthDoctor(doctor))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthPatient
where
    S: Send + Sync,
    PgPool: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = verify_request_token(parts)?;
        gate_patient_claims(&claims)?;

        let pool = PgPool::from_ref(state);
        let patient = PatientRepository::new(pool)
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownIdentity)?;

        debug!("Authenticated patient {}", patient.id);
        Ok(AuthPatient(patient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn parts_without_auth() -> Parts {
        let req = Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn claims(is_doctor: bool, is_patient: bool) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            is_doctor,
            is_patient,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_extract_bearer_returns_token() {
        let parts = parts_with_auth("Bearer some.jwt.token");
        assert_eq!(extract_bearer(&parts).unwrap(), "some.jwt.token");
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let parts = parts_without_auth();
        assert!(matches!(extract_bearer(&parts), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_non_bearer_header_is_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "token_without_bearer", ""] {
            let parts = parts_with_auth(value);
            assert!(extract_bearer(&parts).is_err(), "accepted {:?}", value);
        }
    }

    #[test]
    fn test_doctor_gate_rejects_patient_token() {
        assert!(matches!(
            gate_doctor_claims(&claims(false, true)),
            Err(AuthError::WrongRole)
        ));
    }

    #[test]
    fn test_doctor_gate_rejects_patient_flag_even_with_doctor_flag() {
        // Both flags set should never be issued, but the patient flag wins
        // the rejection either way.
        assert!(matches!(
            gate_doctor_claims(&claims(true, true)),
            Err(AuthError::WrongRole)
        ));
    }

    #[test]
    fn test_doctor_gate_rejects_flagless_token() {
        assert!(matches!(
            gate_doctor_claims(&claims(false, false)),
            Err(AuthError::UnknownIdentity)
        ));
    }

    #[test]
    fn test_doctor_gate_accepts_doctor_token() {
        assert!(gate_doctor_claims(&claims(true, false)).is_ok());
    }

    #[test]
    fn test_patient_gate_rejects_doctor_token() {
        assert!(matches!(
            gate_patient_claims(&claims(true, false)),
            Err(AuthError::WrongRole)
        ));
        assert!(matches!(
            gate_patient_claims(&claims(true, true)),
            Err(AuthError::WrongRole)
        ));
    }

    #[test]
    fn test_patient_gate_accepts_patient_token() {
        assert!(gate_patient_claims(&claims(false, true)).is_ok());
    }
}
