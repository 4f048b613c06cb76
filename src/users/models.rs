// Note models and DTOs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A note written by a doctor about a patient. The ids are references, not
/// ownership; `doctor_id` may be absent.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
}

/// Note creation request DTO
///
/// Required fields are optional here so a missing one surfaces as the
/// domain's "All fields must be filled." rather than a serde rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
}

/// Note edit request DTO; omitted fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditNoteRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_serializes_with_original_wire_names() {
        let note = Note {
            id: Uuid::new_v4(),
            title: "Checkup".to_string(),
            description: "All clear".to_string(),
            patient_id: Uuid::new_v4(),
            doctor_id: Some(Uuid::new_v4()),
        };

        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("patientId").is_some());
        assert!(json.get("doctorId").is_some());
        assert!(json.get("patient_id").is_none());
    }

    #[test]
    fn test_note_with_absent_doctor_serializes_null() {
        let note = Note {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            patient_id: Uuid::new_v4(),
            doctor_id: None,
        };

        let json = serde_json::to_value(&note).unwrap();
        assert!(json["doctorId"].is_null());
    }

    #[test]
    fn test_edit_request_supports_partial_bodies() {
        let edit: EditNoteRequest = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(edit.title.as_deref(), Some("New"));
        assert!(edit.description.is_none());

        let empty: EditNoteRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.title.is_none());
        assert!(empty.description.is_none());
    }
}
