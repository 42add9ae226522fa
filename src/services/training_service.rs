//! Training session scheduling. Trainings share the games' directory gate
//! (the category must exist and be active) but carry no roster.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::TrainingEntity,
    dto::{
        parse_system_time,
        training::{CreateTrainingRequest, TrainingSummary},
    },
    error::ServiceError,
    services::roster_validator,
    state::SharedState,
};

/// List every training session.
pub async fn list_trainings(state: &SharedState) -> Result<Vec<TrainingSummary>, ServiceError> {
    let clubs = state.require_club_store().await?;
    Ok(clubs
        .list_trainings()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Fetch one training by id.
pub async fn get_training(state: &SharedState, id: Uuid) -> Result<TrainingSummary, ServiceError> {
    let training = require_training(state, id).await?;
    Ok(training.into())
}

/// Schedule a training session for an active category.
pub async fn schedule_training(
    state: &SharedState,
    request: CreateTrainingRequest,
) -> Result<TrainingSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let scheduled_at = parse_system_time(&request.scheduled_at).map_err(|err| {
        ServiceError::InvalidInput(format!(
            "invalid RFC3339 timestamp `{}`: {err}",
            request.scheduled_at
        ))
    })?;

    let category = roster_validator::resolve_active_category(state, &request.category).await?;

    let now = SystemTime::now();
    let training = TrainingEntity {
        id: Uuid::new_v4(),
        category: category.name,
        scheduled_at,
        location: request.location,
        notes: request.notes,
        cancelled: false,
        created_at: now,
        updated_at: now,
    };

    clubs.save_training(training.clone()).await?;
    info!(training = %training.id, category = %training.category, "scheduled training");
    Ok(training.into())
}

/// Call off a training session. Cancelling twice is an idempotent no-op.
pub async fn cancel_training(state: &SharedState, id: Uuid) -> Result<TrainingSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut training = require_training(state, id).await?;

    if !training.cancelled {
        training.cancelled = true;
        training.updated_at = SystemTime::now();
        clubs.save_training(training.clone()).await?;
        info!(training = %training.id, "cancelled training");
    }
    Ok(training.into())
}

async fn require_training(state: &SharedState, id: Uuid) -> Result<TrainingEntity, ServiceError> {
    let clubs = state.require_club_store().await?;
    clubs
        .find_training(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("training `{id}` not found")))
}
