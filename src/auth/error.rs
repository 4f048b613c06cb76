// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// Errors produced by the account flows and the auth gateway.
///
/// Guard failures are deliberately indistinguishable on the wire: missing
/// header, bad token, wrong role and unknown identity all answer
/// 401 `{"error": "Not Authorized."}`. The variants exist so the logs can
/// tell the cases apart.
#[derive(Debug)]
pub enum AuthError {
    // Signup/login validation errors
    MissingFields,
    InvalidEmail,
    WeakPassword,
    EmailTaken,
    IncorrectEmail,
    IncorrectPassword,

    // Gateway rejections
    MissingToken,
    InvalidToken,
    ExpiredToken,
    WrongRole,
    UnknownIdentity,

    // Infrastructure failures, surfaced to the caller as-is
    PasswordHashError(String),
    TokenError(String),
    DatabaseError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingFields => write!(f, "All fields must be filled."),
            AuthError::InvalidEmail => write!(f, "Email is not valid."),
            AuthError::WeakPassword => write!(f, "Password not strong enough."),
            AuthError::EmailTaken => write!(f, "Email already in use."),
            AuthError::IncorrectEmail => write!(f, "Incorrect email."),
            AuthError::IncorrectPassword => write!(f, "Incorrect password."),
            AuthError::MissingToken => write!(f, "Missing authorization header"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::WrongRole => write!(f, "Token role is not allowed here"),
            AuthError::UnknownIdentity => write!(f, "Token references no known identity"),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::TokenError(msg) => write!(f, "Token error: {}", msg),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// True for every variant the gateway answers with the uniform 401 body.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::WrongRole
                | AuthError::UnknownIdentity
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_rejection() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = if self.is_rejection() {
            warn!("Authorization rejected: {}", self);
            (StatusCode::UNAUTHORIZED, "Not Authorized.".to_string())
        } else {
            match &self {
                AuthError::PasswordHashError(_)
                | AuthError::TokenError(_)
                | AuthError::DatabaseError(_) => error!("Auth flow failure: {}", self),
                _ => {}
            }
            (StatusCode::BAD_REQUEST, self.to_string())
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(error: sqlx::Error) -> Self {
        AuthError::DatabaseError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_original_wire_messages() {
        assert_eq!(AuthError::MissingFields.to_string(), "All fields must be filled.");
        assert_eq!(AuthError::InvalidEmail.to_string(), "Email is not valid.");
        assert_eq!(AuthError::WeakPassword.to_string(), "Password not strong enough.");
        assert_eq!(AuthError::EmailTaken.to_string(), "Email already in use.");
        assert_eq!(AuthError::IncorrectEmail.to_string(), "Incorrect email.");
        assert_eq!(AuthError::IncorrectPassword.to_string(), "Incorrect password.");
    }

    #[test]
    fn gateway_rejections_map_to_401() {
        for err in [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::WrongRole,
            AuthError::UnknownIdentity,
        ] {
            assert!(err.is_rejection());
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn business_errors_map_to_400() {
        assert_eq!(AuthError::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::DatabaseError("pool timed out".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
