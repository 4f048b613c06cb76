// HTTP handlers for the authenticated subscription and note operations
//
// Every handler here runs behind one of the three auth gateway extractors;
// the resolved identity arrives as an argument.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::middleware::{AuthDoctor, AuthPatient, AuthUser};
use crate::auth::models::{DoctorResponse, Identity, PatientResponse};
use crate::auth::repository::{DoctorRepository, PatientRepository};
use crate::error::ApiError;
use crate::notify::NoteEvent;
use crate::users::models::{CreateNoteRequest, EditNoteRequest, Note};
use crate::users::repository::{NoteRepository, SubscriptionRepository};
use crate::validation;
use crate::AppState;

/// List every doctor
/// GET /api/users/doctors
#[utoipa::path(
    get,
    path = "/api/users/doctors",
    responses(
        (status = 200, description = "All doctors, public profiles"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn get_doctors(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let doctors = SubscriptionRepository::new(state.db.clone())
        .list_doctors()
        .await?;

    let doctors: Vec<DoctorResponse> = doctors.into_iter().map(DoctorResponse::from).collect();
    Ok(Json(json!({ "doctors": doctors })))
}

/// List the doctors the calling patient is subscribed to
/// GET /api/users/yourdoctors
#[utoipa::path(
    get,
    path = "/api/users/yourdoctors",
    responses(
        (status = 200, description = "Subscribed doctors"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn get_your_doctors(
    State(state): State<AppState>,
    AuthPatient(patient): AuthPatient,
) -> Result<Json<Value>, ApiError> {
    let doctors = SubscriptionRepository::new(state.db.clone())
        .find_doctors_by_ids(&patient.doctors)
        .await?;

    let doctors: Vec<DoctorResponse> = doctors.into_iter().map(DoctorResponse::from).collect();
    Ok(Json(json!({ "doctors": doctors })))
}

/// Subscribe the calling patient to a doctor
/// PATCH /api/users/subscribe/:doctorId
///
/// Already subscribed is a no-op returning the current profile; otherwise
/// both mirrored lists are updated in one transaction.
#[utoipa::path(
    patch,
    path = "/api/users/subscribe/{doctorId}",
    params(("doctorId" = Uuid, Path, description = "Doctor to subscribe to")),
    responses(
        (status = 200, description = "Updated patient profile"),
        (status = 400, description = "Unknown doctor id"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    AuthPatient(patient): AuthPatient,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if patient.doctors.contains(&doctor_id) {
        debug!("Patient {} already subscribed to {}", patient.id, doctor_id);
        return Ok(Json(json!({ "updatedPatient": PatientResponse::from(patient) })));
    }

    let updated = SubscriptionRepository::new(state.db.clone())
        .subscribe(patient.id, doctor_id)
        .await?;

    info!("Patient {} subscribed to doctor {}", updated.id, doctor_id);
    Ok(Json(json!({ "updatedPatient": PatientResponse::from(updated) })))
}

/// Unsubscribe the calling patient from a doctor
/// PATCH /api/users/unsubscribe/:doctorId
#[utoipa::path(
    patch,
    path = "/api/users/unsubscribe/{doctorId}",
    params(("doctorId" = Uuid, Path, description = "Doctor to unsubscribe from")),
    responses(
        (status = 200, description = "Updated patient profile"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthPatient(patient): AuthPatient,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let updated = SubscriptionRepository::new(state.db.clone())
        .unsubscribe(patient.id, doctor_id)
        .await?;

    info!("Patient {} unsubscribed from doctor {}", updated.id, doctor_id);
    Ok(Json(json!({ "updatedPatient": PatientResponse::from(updated) })))
}

/// Fetch a patient by id. A miss answers 200 with a null body field.
/// GET /api/users/patient/:patientId
#[utoipa::path(
    get,
    path = "/api/users/patient/{patientId}",
    params(("patientId" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient profile or null"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn get_patient(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let patient = PatientRepository::new(state.db.clone())
        .find_by_id(patient_id)
        .await?
        .map(PatientResponse::from);

    Ok(Json(json!({ "patient": patient })))
}

/// List the patients subscribed to the calling doctor
/// GET /api/users/mypatients
#[utoipa::path(
    get,
    path = "/api/users/mypatients",
    responses(
        (status = 200, description = "Subscribed patients"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn get_my_patients(
    State(state): State<AppState>,
    AuthDoctor(doctor): AuthDoctor,
) -> Result<Json<Value>, ApiError> {
    let patients = SubscriptionRepository::new(state.db.clone())
        .find_patients_by_ids(&doctor.patients)
        .await?;

    let patients: Vec<PatientResponse> =
        patients.into_iter().map(PatientResponse::from).collect();
    Ok(Json(json!({ "patients": patients })))
}

/// Fetch a doctor by id. A miss answers 200 with a null body field.
/// GET /api/users/doctor/:doctorId
#[utoipa::path(
    get,
    path = "/api/users/doctor/{doctorId}",
    params(("doctorId" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor profile or null"),
        (status = 401, description = "Not authorized")
    ),
    tag = "users"
)]
pub async fn get_doctor(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let doctor = DoctorRepository::new(state.db.clone())
        .find_by_id(doctor_id)
        .await?
        .map(DoctorResponse::from);

    Ok(Json(json!({ "doctor": doctor })))
}

/// Create a note about a patient and notify them
/// POST /api/users/note
#[utoipa::path(
    post,
    path = "/api/users/note",
    request_body = CreateNoteRequest,
    responses(
        (status = 200, description = "Created note", body = Note),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Not authorized")
    ),
    tag = "notes"
)]
pub async fn add_note(
    State(state): State<AppState>,
    AuthDoctor(doctor): AuthDoctor,
    Json(request): Json<CreateNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let title = validation::require(&request.title)?;
    let description = validation::require(&request.description)?;
    let patient_id = request.patient_id.ok_or(crate::auth::AuthError::MissingFields)?;

    let note = NoteRepository::new(state.db.clone())
        .create(title, description, patient_id, request.doctor_id)
        .await?;

    info!("Doctor {} added note {} for patient {}", doctor.id, note.id, patient_id);
    notify_patient(&state, patient_id, NoteEvent::Created).await;

    Ok(Json(json!({ "note": note })))
}

/// List notes for a patient, scoped by the caller's role: doctors see only
/// their own notes for that patient, patients see every note for the id.
/// GET /api/users/notes/:patientId
#[utoipa::path(
    get,
    path = "/api/users/notes/{patientId}",
    params(("patientId" = Uuid, Path, description = "Patient the notes are about")),
    responses(
        (status = 200, description = "Role-scoped note list"),
        (status = 401, description = "Not authorized")
    ),
    tag = "notes"
)]
pub async fn get_notes(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let repo = NoteRepository::new(state.db.clone());

    let notes = match &identity {
        Identity::Doctor(doctor) => {
            repo.find_for_patient_by_doctor(patient_id, doctor.id).await?
        }
        Identity::Patient(_) => repo.find_for_patient(patient_id).await?,
    };

    Ok(Json(json!({ "notes": notes })))
}

/// Delete a note by id and notify the patient
/// DELETE /api/users/note/delete/:noteId
#[utoipa::path(
    delete,
    path = "/api/users/note/delete/{noteId}",
    params(("noteId" = Uuid, Path, description = "Note to delete")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Not authorized")
    ),
    tag = "notes"
)]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthDoctor(doctor): AuthDoctor,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let repo = NoteRepository::new(state.db.clone());

    // Resolve the recipient before the row disappears.
    let patient_id = repo.find_by_id(note_id).await?.map(|n| n.patient_id);

    let deleted = repo.delete_by_id(note_id).await?;
    if deleted > 0 {
        info!("Doctor {} deleted note {}", doctor.id, note_id);
        if let Some(patient_id) = patient_id {
            notify_patient(&state, patient_id, NoteEvent::Deleted).await;
        }
    }

    Ok(Json(json!({ "message": "Deleted." })))
}

/// Edit a note's title/description and notify the patient
/// PATCH /api/users/note/edit/:noteId
#[utoipa::path(
    patch,
    path = "/api/users/note/edit/{noteId}",
    params(("noteId" = Uuid, Path, description = "Note to edit")),
    request_body = EditNoteRequest,
    responses(
        (status = 200, description = "Updated note, or null if unknown"),
        (status = 401, description = "Not authorized")
    ),
    tag = "notes"
)]
pub async fn edit_note(
    State(state): State<AppState>,
    AuthDoctor(doctor): AuthDoctor,
    Path(note_id): Path<Uuid>,
    Json(request): Json<EditNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let note = NoteRepository::new(state.db.clone())
        .update(note_id, request.title, request.description)
        .await?;

    if let Some(ref note) = note {
        info!("Doctor {} edited note {}", doctor.id, note.id);
        notify_patient(&state, note.patient_id, NoteEvent::Updated).await;
    }

    Ok(Json(json!({ "note": note })))
}

/// Look up the patient's address and dispatch a fire-and-forget
/// notification. Any failure here is logged and swallowed; the primary
/// mutation has already committed.
async fn notify_patient(state: &AppState, patient_id: Uuid, event: NoteEvent) {
    match PatientRepository::new(state.db.clone())
        .find_by_id(patient_id)
        .await
    {
        Ok(Some(patient)) => state.mailer.notify_note_event(event, patient.email),
        Ok(None) => debug!("No patient {} to notify about {:?}", patient_id, event),
        Err(e) => debug!("Skipping {:?} notification for {}: {}", event, patient_id, e),
    }
}
