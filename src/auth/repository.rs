// Database repositories for the two identity tables

use crate::auth::{
    error::AuthError,
    models::{Doctor, Patient},
};
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const DOCTOR_COLUMNS: &str =
    "id, username, email, password_hash, specialization, patients, created_at";
pub(crate) const PATIENT_COLUMNS: &str = "id, username, email, password_hash, doctors, created_at";

/// Repository for the doctors table
pub struct DoctorRepository {
    pool: PgPool,
}

impl DoctorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new doctor. A concurrent duplicate email loses the race at
    /// the UNIQUE constraint and surfaces as the duplicate-email error.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        specialization: &str,
    ) -> Result<Doctor, AuthError> {
        let query = format!(
            "INSERT INTO doctors (username, email, password_hash, specialization) \
             VALUES ($1, $2, $3, $4) RETURNING {DOCTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Doctor>(&query)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(specialization)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    /// Find a doctor by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, AuthError> {
        let query =
            format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE LOWER(email) = LOWER($1)");
        let doctor = sqlx::query_as::<_, Doctor>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doctor)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, AuthError> {
        let query = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1");
        let doctor = sqlx::query_as::<_, Doctor>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doctor)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM doctors WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }
}

/// Repository for the patients table
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Patient, AuthError> {
        let query = format!(
            "INSERT INTO patients (username, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {PATIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    /// Find a patient by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, AuthError> {
        let query =
            format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE LOWER(email) = LOWER($1)");
        let patient = sqlx::query_as::<_, Patient>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patient)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, AuthError> {
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        let patient = sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patient)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AuthError::EmailTaken;
        }
    }
    AuthError::DatabaseError(e.to_string())
}
