//! Game lifecycle and roster mutations, each gated by the roster validator
//! before anything is persisted.

use std::time::SystemTime;

use indexmap::IndexSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, GameStatus, RosterEntryEntity},
    dto::{
        game::{AddRosterEntryRequest, CreateGameRequest, GameListItem, GameSummary,
            RosterEntryInput, UpdateGameRequest},
        parse_system_time,
    },
    error::ServiceError,
    services::roster_validator,
    state::SharedState,
};

/// List every game as a summary item.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameListItem>, ServiceError> {
    let clubs = state.require_club_store().await?;
    Ok(clubs
        .list_games()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Fetch one game by id.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let game = require_game(state, id).await?;
    Ok(game.into())
}

/// Schedule a game. The whole roster is validated against the named category
/// before the document is persisted; the stored category is the canonical
/// directory spelling.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let scheduled_at = parse_timestamp(&request.scheduled_at)?;

    let roster = dedup_roster(request.roster);
    let student_ids: Vec<Uuid> = roster.iter().map(|entry| entry.student_id).collect();
    let category = roster_validator::validate_roster(state, &request.category, &student_ids).await?;

    let now = SystemTime::now();
    let game = GameEntity {
        id: Uuid::new_v4(),
        category: category.name,
        opponent: request.opponent,
        location: request.location,
        scheduled_at,
        status: GameStatus::Scheduled,
        roster,
        created_at: now,
        updated_at: now,
    };

    clubs.save_game(game.clone()).await?;
    info!(game = %game.id, category = %game.category, players = game.roster.len(), "scheduled game");
    Ok(game.into())
}

/// Full update of a scheduled game. The effective category and replacement
/// roster are re-validated against the directory as it is now.
pub async fn update_game(
    state: &SharedState,
    id: Uuid,
    request: UpdateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut game = require_game(state, id).await?;
    roster_validator::ensure_unlocked(&game)?;

    let category_name = request.category.unwrap_or_else(|| game.category.clone());
    let roster = match request.roster {
        Some(entries) => dedup_roster(entries),
        None => game.roster.clone(),
    };
    let student_ids: Vec<Uuid> = roster.iter().map(|entry| entry.student_id).collect();
    let category = roster_validator::validate_roster(state, &category_name, &student_ids).await?;

    game.category = category.name;
    game.roster = roster;
    if let Some(opponent) = request.opponent {
        game.opponent = opponent;
    }
    if let Some(location) = request.location {
        game.location = location;
    }
    if let Some(scheduled_at) = request.scheduled_at {
        game.scheduled_at = parse_timestamp(&scheduled_at)?;
    }
    game.updated_at = SystemTime::now();

    clubs.save_game(game.clone()).await?;
    Ok(game.into())
}

/// Mark a scheduled game as played.
pub async fn finish_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    transition_game(state, id, GameStatus::Finished).await
}

/// Call off a scheduled game. A finished game cannot be cancelled.
pub async fn cancel_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    transition_game(state, id, GameStatus::Cancelled).await
}

/// Add one student to the roster. A student already present is an
/// idempotent no-op, not a failure.
pub async fn add_roster_entry(
    state: &SharedState,
    id: Uuid,
    request: AddRosterEntryRequest,
) -> Result<GameSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut game = require_game(state, id).await?;

    roster_validator::validate_add_one(state, &game, request.student_id).await?;

    let added = game.add_roster_entry(RosterEntryEntity {
        student_id: request.student_id,
        position: request.position,
    });
    if added {
        clubs.save_game(game.clone()).await?;
    } else {
        debug!(game = %game.id, student = %request.student_id, "student already in roster");
    }
    Ok(game.into())
}

/// Remove one student from the roster. Removing an absent student is a
/// no-op, not an error.
pub async fn remove_roster_entry(
    state: &SharedState,
    id: Uuid,
    student_id: Uuid,
) -> Result<GameSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut game = require_game(state, id).await?;
    roster_validator::ensure_unlocked(&game)?;

    if game.remove_roster_entry(student_id) {
        clubs.save_game(game.clone()).await?;
    }
    Ok(game.into())
}

async fn transition_game(
    state: &SharedState,
    id: Uuid,
    next: GameStatus,
) -> Result<GameSummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut game = require_game(state, id).await?;

    if !game.status.can_become(next) {
        return Err(ServiceError::InvalidState(format!(
            "a {} game cannot become {next}",
            game.status
        )));
    }

    game.status = next;
    game.updated_at = SystemTime::now();
    clubs.save_game(game.clone()).await?;
    info!(game = %game.id, status = %next, "game status changed");
    Ok(game.into())
}

async fn require_game(state: &SharedState, id: Uuid) -> Result<GameEntity, ServiceError> {
    let clubs = state.require_club_store().await?;
    clubs
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
}

/// Collapse duplicate student references, keeping the first occurrence of
/// each, matching the idempotent semantics of the add-one path.
fn dedup_roster(entries: Vec<RosterEntryInput>) -> Vec<RosterEntryEntity> {
    let mut seen = IndexSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.student_id))
        .map(|entry| RosterEntryEntity {
            student_id: entry.student_id,
            position: entry.position,
        })
        .collect()
}

fn parse_timestamp(value: &str) -> Result<SystemTime, ServiceError> {
    parse_system_time(value).map_err(|err| {
        ServiceError::InvalidInput(format!("invalid RFC3339 timestamp `{value}`: {err}"))
    })
}
