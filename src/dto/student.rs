use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{dao::models::StudentEntity, dto::format_system_time};

/// Payload used to register a student.
///
/// Both membership representations may be supplied: `categories` is the
/// current model, `category` the legacy single-value field older UI paths
/// still send. When only the list is given, the scalar is seeded with its
/// first entry.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 2, max = 120, message = "name must be 2 to 120 characters"))]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Legacy single-category field.
    #[serde(default)]
    pub category: Option<String>,
}

/// Payload used to update a student. `category` distinguishes "leave
/// unchanged" (absent) from "clear" (null), matching the legacy write path.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Legacy single-category field.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

impl Validate for UpdateStudentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            let length = name.trim().chars().count();
            if !(2..=120).contains(&length) {
                let mut err = ValidationError::new("name_length");
                err.message = Some("name must be 2 to 120 characters".into());
                errors.add("name", err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Student projection exposed to REST clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    /// Legacy single-category field.
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<StudentEntity> for StudentSummary {
    fn from(entity: StudentEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            categories: entity.categories,
            category: entity.category,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}
