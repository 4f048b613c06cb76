// Subscription and note persistence

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::models::{Doctor, Patient};
use crate::auth::repository::{DOCTOR_COLUMNS, PATIENT_COLUMNS};
use crate::error::ApiError;
use crate::users::models::Note;

const NOTE_COLUMNS: &str = "id, title, description, patient_id, doctor_id";

/// Manages the mirrored subscription lists on both identity tables.
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        let query = format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY created_at");
        let doctors = sqlx::query_as::<_, Doctor>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(doctors)
    }

    pub async fn find_doctors_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Doctor>, ApiError> {
        let query = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ANY($1)");
        let doctors = sqlx::query_as::<_, Doctor>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(doctors)
    }

    pub async fn find_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, ApiError> {
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ANY($1)");
        let patients = sqlx::query_as::<_, Patient>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(patients)
    }

    /// Append the doctor to the patient's list and the patient to the
    /// doctor's list. The caller is responsible for the containment
    /// pre-check; both writes run in one transaction, so an unknown doctor
    /// id rolls the patient-side write back instead of leaving a dangling
    /// reference.
    pub async fn subscribe(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Patient, ApiError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE patients SET doctors = array_append(doctors, $1) \
             WHERE id = $2 RETURNING {PATIENT_COLUMNS}"
        );
        let updated_patient = sqlx::query_as::<_, Patient>(&query)
            .bind(doctor_id)
            .bind(patient_id)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE doctors SET patients = array_append(patients, $1) WHERE id = $2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping tx rolls back the patient-side append.
            return Err(ApiError::DoctorNotFound);
        }

        tx.commit().await?;
        Ok(updated_patient)
    }

    /// Remove the pair from both sides. Removing an absent id is a no-op on
    /// either side and still succeeds.
    pub async fn unsubscribe(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Patient, ApiError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE patients SET doctors = array_remove(doctors, $1) \
             WHERE id = $2 RETURNING {PATIENT_COLUMNS}"
        );
        let updated_patient = sqlx::query_as::<_, Patient>(&query)
            .bind(doctor_id)
            .bind(patient_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE doctors SET patients = array_remove(patients, $1) WHERE id = $2")
            .bind(patient_id)
            .bind(doctor_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated_patient)
    }
}

/// Note storage
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        title: &str,
        description: &str,
        patient_id: Uuid,
        doctor_id: Option<Uuid>,
    ) -> Result<Note, ApiError> {
        let query = format!(
            "INSERT INTO notes (title, description, patient_id, doctor_id) \
             VALUES ($1, $2, $3, $4) RETURNING {NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&query)
            .bind(title)
            .bind(description)
            .bind(patient_id)
            .bind(doctor_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    /// Every note for the patient, regardless of author.
    pub async fn find_for_patient(&self, patient_id: Uuid) -> Result<Vec<Note>, ApiError> {
        let query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE patient_id = $1");
        let notes = sqlx::query_as::<_, Note>(&query)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    /// Only the notes the given doctor wrote for the patient.
    pub async fn find_for_patient_by_doctor(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Vec<Note>, ApiError> {
        let query = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE patient_id = $1 AND doctor_id = $2"
        );
        let notes = sqlx::query_as::<_, Note>(&query)
            .bind(patient_id)
            .bind(doctor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, ApiError> {
        let query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        let note = sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    /// Partial update; omitted fields keep their stored value. Returns
    /// `None` when the note does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Option<Note>, ApiError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE notes SET title = $1, description = $2 WHERE id = $3 RETURNING {NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&query)
            .bind(title.unwrap_or(existing.title))
            .bind(description.unwrap_or(existing.description))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(Some(note))
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
