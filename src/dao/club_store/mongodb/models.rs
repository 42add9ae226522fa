use indexmap::IndexSet;
use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    CategoryEntity, GameEntity, GameStatus, RosterEntryEntity, TrainingEntity,
};

/// Category document as stored in the `categories` collection.
///
/// `name_lower` is a lowercased shadow of `name` so case-insensitive lookups
/// and the uniqueness index stay simple equality matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCategoryDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    name_lower: String,
    description: Option<String>,
    color: String,
    min_age: Option<u8>,
    max_age: Option<u8>,
    active: bool,
    member_ids: Vec<Uuid>,
    member_count: i64,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<CategoryEntity> for MongoCategoryDocument {
    fn from(value: CategoryEntity) -> Self {
        Self {
            id: value.id,
            name_lower: value.name.to_lowercase(),
            name: value.name,
            description: value.description,
            color: value.color,
            min_age: value.min_age,
            max_age: value.max_age,
            active: value.active,
            member_count: value.member_ids.len() as i64,
            member_ids: value.member_ids.into_iter().collect(),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoCategoryDocument> for CategoryEntity {
    fn from(value: MongoCategoryDocument) -> Self {
        let member_ids: IndexSet<Uuid> = value.member_ids.into_iter().collect();
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            color: value.color,
            min_age: value.min_age,
            max_age: value.max_age,
            active: value.active,
            member_count: member_ids.len() as u64,
            member_ids,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Game document as stored in the `games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    category: String,
    opponent: Option<String>,
    location: Option<String>,
    scheduled_at: DateTime,
    status: GameStatus,
    roster: Vec<RosterEntryEntity>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            category: value.category,
            opponent: value.opponent,
            location: value.location,
            scheduled_at: DateTime::from_system_time(value.scheduled_at),
            status: value.status,
            roster: value.roster,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            category: value.category,
            opponent: value.opponent,
            location: value.location,
            scheduled_at: value.scheduled_at.to_system_time(),
            status: value.status,
            roster: value.roster,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Training document as stored in the `trainings` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTrainingDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    category: String,
    scheduled_at: DateTime,
    location: Option<String>,
    notes: Option<String>,
    #[serde(default)]
    cancelled: bool,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<TrainingEntity> for MongoTrainingDocument {
    fn from(value: TrainingEntity) -> Self {
        Self {
            id: value.id,
            category: value.category,
            scheduled_at: DateTime::from_system_time(value.scheduled_at),
            location: value.location,
            notes: value.notes,
            cancelled: value.cancelled,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoTrainingDocument> for TrainingEntity {
    fn from(value: MongoTrainingDocument) -> Self {
        Self {
            id: value.id,
            category: value.category,
            scheduled_at: value.scheduled_at.to_system_time(),
            location: value.location,
            notes: value.notes,
            cancelled: value.cancelled,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
