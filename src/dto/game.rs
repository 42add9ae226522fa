use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{GameEntity, GameListItemEntity, GameStatus, RosterEntryEntity},
    dto::format_system_time,
};

/// One incoming roster slot.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RosterEntryInput {
    pub student_id: Uuid,
    /// Optional position tag (e.g. "goleiro").
    #[serde(default)]
    pub position: Option<String>,
}

/// Payload used to schedule a game. Every roster entry must belong to the
/// named category or the whole request is rejected.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, message = "category name is required"))]
    pub category: String,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Kick-off time, RFC3339.
    pub scheduled_at: String,
    #[serde(default)]
    pub roster: Vec<RosterEntryInput>,
}

/// Payload used to update a scheduled game. Double-`Option` fields
/// distinguish "leave unchanged" (absent) from "clear" (null). A provided
/// roster replaces the whole lineup and is re-validated.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub opponent: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    /// Kick-off time, RFC3339.
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub roster: Option<Vec<RosterEntryInput>>,
}

impl Validate for UpdateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref category) = self.category {
            if category.trim().is_empty() {
                let mut err = ValidationError::new("category_empty");
                err.message = Some("category name must not be empty".into());
                errors.add("category", err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload adding a single student to a game's roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddRosterEntryRequest {
    pub student_id: Uuid,
    /// Optional position tag.
    #[serde(default)]
    pub position: Option<String>,
}

/// One roster slot as exposed to REST clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterEntrySummary {
    pub student_id: Uuid,
    pub position: Option<String>,
}

impl From<RosterEntryEntity> for RosterEntrySummary {
    fn from(entry: RosterEntryEntity) -> Self {
        Self {
            student_id: entry.student_id,
            position: entry.position,
        }
    }
}

/// Game projection exposed to REST clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub category: String,
    pub opponent: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: String,
    pub status: GameStatus,
    pub roster: Vec<RosterEntrySummary>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameSummary {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            category: entity.category,
            opponent: entity.opponent,
            location: entity.location,
            scheduled_at: format_system_time(entity.scheduled_at),
            status: entity.status,
            roster: entity.roster.into_iter().map(Into::into).collect(),
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Game list item exposed by the listing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListItem {
    pub id: Uuid,
    pub category: String,
    pub opponent: Option<String>,
    pub scheduled_at: String,
    pub status: GameStatus,
    pub roster_size: usize,
}

impl From<GameListItemEntity> for GameListItem {
    fn from(entity: GameListItemEntity) -> Self {
        Self {
            id: entity.id,
            category: entity.category,
            opponent: entity.opponent,
            scheduled_at: format_system_time(entity.scheduled_at),
            status: entity.status,
            roster_size: entity.roster_size,
        }
    }
}
