use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::CategoryEntity,
    dto::{
        format_system_time,
        validation::{validate_category_name, validate_hex_color},
    },
};

/// Payload used to create a category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional `#rrggbb` color; when omitted the backend picks the first
    /// palette entry not used by an existing category.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub min_age: Option<u8>,
    #[serde(default)]
    pub max_age: Option<u8>,
    /// Defaults to active.
    #[serde(default)]
    pub active: Option<bool>,
}

impl Validate for CreateCategoryRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_category_name(&self.name) {
            errors.add("name", e);
        }

        if let Some(ref color) = self.color {
            if let Err(e) = validate_hex_color(color) {
                errors.add("color", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload used to update a category. Double-`Option` fields distinguish
/// "leave unchanged" (absent) from "clear" (null).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    /// New display name; changing it propagates to every linked student.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub min_age: Option<Option<u8>>,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub max_age: Option<Option<u8>>,
}

impl Validate for UpdateCategoryRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            if let Err(e) = validate_category_name(name) {
                errors.add("name", e);
            }
        }

        if let Some(ref color) = self.color {
            if let Err(e) = validate_hex_color(color) {
                errors.add("color", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload linking a batch of students to a category.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LinkStudentsRequest {
    #[validate(length(min = 1, message = "at least one student id is required"))]
    pub student_ids: Vec<Uuid>,
}

/// Category projection exposed to REST clients, including the cached
/// membership view.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub min_age: Option<u8>,
    pub max_age: Option<u8>,
    pub active: bool,
    pub member_count: u64,
    pub member_ids: Vec<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CategoryEntity> for CategorySummary {
    fn from(entity: CategoryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            color: entity.color,
            min_age: entity.min_age,
            max_age: entity.max_age,
            active: entity.active,
            member_count: entity.member_count,
            member_ids: entity.member_ids.into_iter().collect(),
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}
