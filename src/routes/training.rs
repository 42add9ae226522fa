use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::training::{CreateTrainingRequest, TrainingSummary},
    error::AppError,
    services::training_service,
    state::SharedState,
};

/// Routes handling training sessions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/trainings", get(list_trainings).post(schedule_training))
        .route("/trainings/{id}", get(get_training))
        .route("/trainings/{id}/cancel", post(cancel_training))
}

/// List every training session.
#[utoipa::path(
    get,
    path = "/trainings",
    tag = "trainings",
    responses((status = 200, description = "All trainings", body = [TrainingSummary]))
)]
pub async fn list_trainings(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TrainingSummary>>, AppError> {
    let trainings = training_service::list_trainings(&state).await?;
    Ok(Json(trainings))
}

/// Fetch one training session.
#[utoipa::path(
    get,
    path = "/trainings/{id}",
    tag = "trainings",
    params(("id" = Uuid, Path, description = "Training identifier")),
    responses(
        (status = 200, description = "The training", body = TrainingSummary),
        (status = 404, description = "Unknown training")
    )
)]
pub async fn get_training(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainingSummary>, AppError> {
    let training = training_service::get_training(&state, id).await?;
    Ok(Json(training))
}

/// Schedule a training for an active category.
#[utoipa::path(
    post,
    path = "/trainings",
    tag = "trainings",
    request_body = CreateTrainingRequest,
    responses(
        (status = 200, description = "Training scheduled", body = TrainingSummary),
        (status = 400, description = "Category missing or inactive")
    )
)]
pub async fn schedule_training(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTrainingRequest>>,
) -> Result<Json<TrainingSummary>, AppError> {
    let training = training_service::schedule_training(&state, payload).await?;
    Ok(Json(training))
}

/// Call off a training session.
#[utoipa::path(
    post,
    path = "/trainings/{id}/cancel",
    tag = "trainings",
    params(("id" = Uuid, Path, description = "Training identifier")),
    responses((status = 200, description = "Training cancelled", body = TrainingSummary))
)]
pub async fn cancel_training(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainingSummary>, AppError> {
    let training = training_service::cancel_training(&state, id).await?;
    Ok(Json(training))
}
