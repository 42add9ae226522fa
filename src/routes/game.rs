use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{
        AddRosterEntryRequest, CreateGameRequest, GameListItem, GameSummary, UpdateGameRequest,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling games and their rosters.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game).put(update_game))
        .route("/games/{id}/finish", post(finish_game))
        .route("/games/{id}/cancel", post(cancel_game))
        .route("/games/{id}/roster", post(add_roster_entry))
        .route("/games/{id}/roster/{student_id}", delete(remove_roster_entry))
}

/// List every game.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses((status = 200, description = "All games", body = [GameListItem]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameListItem>>, AppError> {
    let games = game_service::list_games(&state).await?;
    Ok(Json(games))
}

/// Fetch one game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "The game", body = GameSummary),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::get_game(&state, id).await?;
    Ok(Json(game))
}

/// Schedule a game; the whole roster is validated against the category.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game scheduled", body = GameSummary),
        (status = 400, description = "Roster or category rejected")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::create_game(&state, payload).await?;
    Ok(Json(game))
}

/// Update a scheduled game; the replacement roster is re-validated.
#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameSummary),
        (status = 400, description = "Roster or category rejected"),
        (status = 409, description = "Game is no longer scheduled")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateGameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::update_game(&state, id, payload).await?;
    Ok(Json(game))
}

/// Mark a scheduled game as played.
#[utoipa::path(
    post,
    path = "/games/{id}/finish",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses((status = 200, description = "Game finished", body = GameSummary))
)]
pub async fn finish_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::finish_game(&state, id).await?;
    Ok(Json(game))
}

/// Call off a scheduled game; a finished game cannot be cancelled.
#[utoipa::path(
    post,
    path = "/games/{id}/cancel",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game cancelled", body = GameSummary),
        (status = 409, description = "Game already finished")
    )
)]
pub async fn cancel_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::cancel_game(&state, id).await?;
    Ok(Json(game))
}

/// Add one student to the roster; duplicates are an idempotent no-op.
#[utoipa::path(
    post,
    path = "/games/{id}/roster",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = AddRosterEntryRequest,
    responses(
        (status = 200, description = "Roster entry added", body = GameSummary),
        (status = 400, description = "Student not a member of the game's category")
    )
)]
pub async fn add_roster_entry(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AddRosterEntryRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::add_roster_entry(&state, id, payload).await?;
    Ok(Json(game))
}

/// Remove one student from the roster; absent students are a no-op.
#[utoipa::path(
    delete,
    path = "/games/{id}/roster/{student_id}",
    tag = "games",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("student_id" = Uuid, Path, description = "Student identifier")
    ),
    responses((status = 200, description = "Roster entry removed", body = GameSummary))
)]
pub async fn remove_roster_entry(
    State(state): State<SharedState>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::remove_roster_entry(&state, id, student_id).await?;
    Ok(Json(game))
}
