// Identity models and auth DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// User role, mutually exclusive per identity and fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Doctor,
    Patient,
}

/// Doctor database model
#[derive(Debug, Clone, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub specialization: String,
    /// Ids of subscribed patients, mirrored by `Patient::doctors`.
    pub patients: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Patient database model
#[derive(Debug, Clone, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Ids of subscribed doctors, mirrored by `Doctor::patients`.
    pub doctors: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// An authenticated identity of either variant, as attached by the
/// generic guard. The two tables share the common fields accessed here;
/// role-specific data stays on the variant.
#[derive(Debug, Clone)]
pub enum Identity {
    Doctor(Doctor),
    Patient(Patient),
}

impl Identity {
    pub fn id(&self) -> Uuid {
        match self {
            Identity::Doctor(d) => d.id,
            Identity::Patient(p) => p.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Identity::Doctor(_) => Role::Doctor,
            Identity::Patient(_) => Role::Patient,
        }
    }
}

/// Doctor signup request DTO
///
/// Fields are optional so that a missing field surfaces as the domain's own
/// "All fields must be filled." instead of a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DoctorSignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub specialization: Option<String>,
}

/// Patient signup request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct PatientSignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Unified login request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Authentication response: token plus public profile fields. The password
/// hash is never serialized. Doctors carry `specialization` and `patients`,
/// patients carry `doctors`; the unused side is omitted from the JSON.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: Uuid,
    pub is_doctor: bool,
    pub is_patient: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patients: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctors: Option<Vec<Uuid>>,
}

impl AuthResponse {
    pub fn for_doctor(token: String, doctor: &Doctor) -> Self {
        Self {
            token,
            username: doctor.username.clone(),
            email: doctor.email.clone(),
            user_id: doctor.id,
            is_doctor: true,
            is_patient: false,
            specialization: Some(doctor.specialization.clone()),
            patients: Some(doctor.patients.clone()),
            doctors: None,
        }
    }

    pub fn for_patient(token: String, patient: &Patient) -> Self {
        Self {
            token,
            username: patient.username.clone(),
            email: patient.email.clone(),
            user_id: patient.id,
            is_doctor: false,
            is_patient: true,
            specialization: None,
            patients: None,
            doctors: Some(patient.doctors.clone()),
        }
    }
}

/// Public doctor profile (excludes password_hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub specialization: String,
    pub is_doctor: bool,
    pub is_patient: bool,
    pub patients: Vec<Uuid>,
}

impl From<Doctor> for DoctorResponse {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            username: doctor.username,
            email: doctor.email,
            specialization: doctor.specialization,
            is_doctor: true,
            is_patient: false,
            patients: doctor.patients,
        }
    }
}

/// Public patient profile (excludes password_hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_doctor: bool,
    pub is_patient: bool,
    pub doctors: Vec<Uuid>,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            username: patient.username,
            email: patient.email,
            is_doctor: false,
            is_patient: true,
            doctors: patient.doctors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            username: "Dr A".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            specialization: "cardio".to_string(),
            patients: vec![],
            created_at: Utc::now(),
        }
    }

    fn sample_patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            username: "P1".to_string(),
            email: "p@x.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            doctors: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_auth_response_never_contains_password_hash() {
        let doctor = sample_doctor();
        let response = AuthResponse::for_doctor("tok".to_string(), &doctor);
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("password"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_doctor_auth_response_wire_shape() {
        let doctor = sample_doctor();
        let json =
            serde_json::to_value(AuthResponse::for_doctor("tok".to_string(), &doctor)).unwrap();

        assert_eq!(json["isDoctor"], true);
        assert_eq!(json["isPatient"], false);
        assert_eq!(json["userId"], doctor.id.to_string());
        assert_eq!(json["specialization"], "cardio");
        assert!(json["patients"].is_array());
        assert!(json.get("doctors").is_none());
    }

    #[test]
    fn test_patient_auth_response_wire_shape() {
        let patient = sample_patient();
        let json =
            serde_json::to_value(AuthResponse::for_patient("tok".to_string(), &patient)).unwrap();

        assert_eq!(json["isDoctor"], false);
        assert_eq!(json["isPatient"], true);
        assert!(json["doctors"].is_array());
        assert!(json.get("patients").is_none());
        assert!(json.get("specialization").is_none());
    }

    #[test]
    fn test_public_profiles_exclude_password_hash() {
        let doctor_json = serde_json::to_string(&DoctorResponse::from(sample_doctor())).unwrap();
        let patient_json = serde_json::to_string(&PatientResponse::from(sample_patient())).unwrap();

        assert!(!doctor_json.contains("password"));
        assert!(!patient_json.contains("password"));
    }

    #[test]
    fn test_signup_request_tolerates_missing_fields() {
        let req: DoctorSignupRequest = serde_json::from_str(r#"{"email": "a@x.com"}"#).unwrap();
        assert!(req.username.is_none());
        assert_eq!(req.email.as_deref(), Some("a@x.com"));
        assert!(req.password.is_none());
        assert!(req.specialization.is_none());
    }

    #[test]
    fn test_identity_exposes_common_fields() {
        let doctor = sample_doctor();
        let id = doctor.id;
        let identity = Identity::Doctor(doctor);

        assert_eq!(identity.id(), id);
        assert_eq!(identity.role(), Role::Doctor);
    }
}
