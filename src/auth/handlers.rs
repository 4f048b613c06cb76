// HTTP handlers for the account flows: doctor/patient signup, unified login

use axum::{extract::State, Json};
use tracing::{debug, info};

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, DoctorSignupRequest, LoginRequest, PatientSignupRequest, Role},
    password::PasswordService,
    repository::{DoctorRepository, PatientRepository},
    token::TokenService,
};
use crate::validation;
use crate::AppState;

/// Create a doctor account and return a bearer token
/// POST /api/auth/doctor/signup
///
/// The checks run sequentially and short-circuit on the first failure;
/// identity creation is the last step before token issuance, so no partial
/// identity is ever left behind.
#[utoipa::path(
    post,
    path = "/api/auth/doctor/signup",
    request_body = DoctorSignupRequest,
    responses(
        (status = 200, description = "Doctor created, token issued", body = AuthResponse),
        (status = 400, description = "Validation or uniqueness failure", body = String, example = json!({"error": "Email already in use."}))
    ),
    tag = "auth"
)]
pub async fn doctor_signup(
    State(state): State<AppState>,
    Json(request): Json<DoctorSignupRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let username = validation::require(&request.username)?;
    let email = validation::require(&request.email)?;
    let password = validation::require(&request.password)?;
    let specialization = validation::require(&request.specialization)?;

    validation::validate_email(email)?;
    PasswordService::validate_password_strength(password)?;

    let repo = DoctorRepository::new(state.db.clone());
    if repo.email_exists(email).await? {
        debug!("Doctor signup rejected, email already in use");
        return Err(AuthError::EmailTaken);
    }

    let hash = PasswordService::hash_password(password)?;
    let doctor = repo.create(username, email, &hash, specialization).await?;

    let token = TokenService::from_env()?.issue(doctor.id, Role::Doctor)?;
    info!("Doctor account created: {}", doctor.id);

    Ok(Json(AuthResponse::for_doctor(token, &doctor)))
}

/// Create a patient account and return a bearer token
/// POST /api/auth/patient/signup
#[utoipa::path(
    post,
    path = "/api/auth/patient/signup",
    request_body = PatientSignupRequest,
    responses(
        (status = 200, description = "Patient created, token issued", body = AuthResponse),
        (status = 400, description = "Validation or uniqueness failure", body = String, example = json!({"error": "Password not strong enough."}))
    ),
    tag = "auth"
)]
pub async fn patient_signup(
    State(state): State<AppState>,
    Json(request): Json<PatientSignupRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let username = validation::require(&request.username)?;
    let email = validation::require(&request.email)?;
    let password = validation::require(&request.password)?;

    validation::validate_email(email)?;
    PasswordService::validate_password_strength(password)?;

    let repo = PatientRepository::new(state.db.clone());
    if repo.email_exists(email).await? {
        debug!("Patient signup rejected, email already in use");
        return Err(AuthError::EmailTaken);
    }

    let hash = PasswordService::hash_password(password)?;
    let patient = repo.create(username, email, &hash).await?;

    let token = TokenService::from_env()?.issue(patient.id, Role::Patient)?;
    info!("Patient account created: {}", patient.id);

    Ok(Json(AuthResponse::for_patient(token, &patient)))
}

/// Authenticate either role with one endpoint
/// POST /api/auth/login
///
/// The doctors table is probed first. An email present in both tables
/// always authenticates as the doctor; the colliding patient identity is
/// unreachable through this path.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, token issued", body = AuthResponse),
        (status = 400, description = "Bad credentials", body = String, example = json!({"error": "Incorrect password."}))
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let email = validation::require(&request.email)?;
    let password = validation::require(&request.password)?;

    let token_service = TokenService::from_env()?;

    if let Some(doctor) = DoctorRepository::new(state.db.clone())
        .find_by_email(email)
        .await?
    {
        if !PasswordService::verify_password(password, &doctor.password_hash)? {
            return Err(AuthError::IncorrectPassword);
        }
        let token = token_service.issue(doctor.id, Role::Doctor)?;
        info!("Doctor logged in: {}", doctor.id);
        return Ok(Json(AuthResponse::for_doctor(token, &doctor)));
    }

    let patient = PatientRepository::new(state.db.clone())
        .find_by_email(email)
        .await?
        .ok_or(AuthError::IncorrectEmail)?;

    if !PasswordService::verify_password(password, &patient.password_hash)? {
        return Err(AuthError::IncorrectPassword);
    }
    let token = token_service.issue(patient.id, Role::Patient)?;
    info!("Patient logged in: {}", patient.id);

    Ok(Json(AuthResponse::for_patient(token, &patient)))
}
