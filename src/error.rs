// Error handling for the authenticated subscription and note operations
//
// The wire contract is a flat `{"error": "<message>"}` body. Store failures
// are attempted once and surfaced to the caller with the underlying message;
// there is no retry layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::auth::AuthError;

#[derive(Debug)]
pub enum ApiError {
    /// Subscribe target does not exist; the paired write rolled back.
    DoctorNotFound,
    /// Database operation failure, exposed as-is with a 400.
    DatabaseError(sqlx::Error),
    /// Failure from the auth layer (validation or guard rejection).
    Auth(AuthError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::DoctorNotFound => write!(f, "Doctor not found."),
            ApiError::DatabaseError(e) => write!(f, "{}", e),
            ApiError::Auth(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Guard rejections keep their uniform 401 body.
            ApiError::Auth(auth_error) => auth_error.into_response(),
            ApiError::DoctorNotFound => {
                let body = Json(json!({ "error": self.to_string() }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::DatabaseError(ref e) => {
                error!("Database error: {:?}", e);
                let body = Json(json!({ "error": self.to_string() }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Auth(error)
    }
}
