use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::TrainingEntity, dto::format_system_time};

/// Payload used to schedule a training session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTrainingRequest {
    #[validate(length(min = 1, message = "category name is required"))]
    pub category: String,
    /// Session start time, RFC3339.
    pub scheduled_at: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Training projection exposed to REST clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrainingSummary {
    pub id: Uuid,
    pub category: String,
    pub scheduled_at: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub cancelled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TrainingEntity> for TrainingSummary {
    fn from(entity: TrainingEntity) -> Self {
        Self {
            id: entity.id,
            category: entity.category,
            scheduled_at: format_system_time(entity.scheduled_at),
            location: entity.location,
            notes: entity.notes,
            cancelled: entity.cancelled,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}
