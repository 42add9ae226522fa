//! Roster validation: gatekeeper for every operation that establishes or
//! changes a game's roster.
//!
//! Checks run on every write, never once-and-flagged: a category deactivated
//! after a game was scheduled leaves the existing roster alone, but the next
//! edit of that game re-validates against the directory as it is then.

use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{CategoryEntity, GameEntity, GameStatus},
    error::ServiceError,
    services::membership::{self, MemberCheck},
    state::SharedState,
};

/// Rejections raised by the roster checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    /// The named category does not exist in the directory.
    #[error("category `{0}` not found")]
    CategoryNotFound(String),
    /// The named category exists but is deactivated.
    #[error("category `{0}` is inactive")]
    CategoryInactive(String),
    /// One or more roster entries failed the membership checks. Every entry
    /// is checked before the rejection is raised, so the violation list is
    /// complete.
    #[error("roster rejected for category `{category}`: {}", violation_summary(.violations))]
    Rejected {
        /// Canonical name of the category the roster was checked against.
        category: String,
        /// Every offending entry.
        violations: Vec<RosterViolation>,
    },
    /// The game is no longer scheduled, so its roster may not be edited.
    #[error("roster is locked: game is {status}")]
    RosterLocked {
        /// Status that locked the roster.
        status: GameStatus,
    },
}

/// A single offending roster entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterViolation {
    /// The student reference does not resolve.
    #[error("student `{0}` not found")]
    StudentNotFound(Uuid),
    /// The student exists but does not belong to the game's category.
    #[error("student `{student_id}` is not a member of `{category}`")]
    StudentNotInCategory {
        /// Offending student.
        student_id: Uuid,
        /// Category the game is played under.
        category: String,
    },
}

fn violation_summary(violations: &[RosterViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve a category name against the directory and require it to be active.
/// Returns the entity so callers persist the canonical name, not the client's
/// spelling of it.
pub async fn resolve_active_category(
    state: &SharedState,
    category_name: &str,
) -> Result<CategoryEntity, ServiceError> {
    let clubs = state.require_club_store().await?;
    let Some(category) = clubs.find_category_by_name(category_name).await? else {
        return Err(RosterError::CategoryNotFound(category_name.to_owned()).into());
    };
    if !category.active {
        return Err(RosterError::CategoryInactive(category.name).into());
    }
    Ok(category)
}

/// Validate a full roster against a category: the category must exist and be
/// active, and every student must resolve and be a member. All entries are
/// checked so the rejection enumerates the complete violation set.
///
/// Runs on game creation and on whole-roster replacement.
pub async fn validate_roster(
    state: &SharedState,
    category_name: &str,
    student_ids: &[Uuid],
) -> Result<CategoryEntity, ServiceError> {
    let category = resolve_active_category(state, category_name).await?;

    let mut violations = Vec::new();
    let mut seen = Vec::new();
    for &student_id in student_ids {
        if seen.contains(&student_id) {
            continue;
        }
        seen.push(student_id);

        match membership::check_member(state, student_id, &category.name).await? {
            MemberCheck::Member => {}
            MemberCheck::NotMember => violations.push(RosterViolation::StudentNotInCategory {
                student_id,
                category: category.name.clone(),
            }),
            MemberCheck::UnknownStudent => {
                violations.push(RosterViolation::StudentNotFound(student_id))
            }
        }
    }

    if !violations.is_empty() {
        return Err(RosterError::Rejected {
            category: category.name,
            violations,
        }
        .into());
    }

    Ok(category)
}

/// Validate adding one student to an existing game's roster against the
/// game's current category and the directory as it is now.
pub async fn validate_add_one(
    state: &SharedState,
    game: &GameEntity,
    student_id: Uuid,
) -> Result<(), ServiceError> {
    ensure_unlocked(game)?;
    validate_roster(state, &game.category, &[student_id]).await?;
    Ok(())
}

/// Require the game to still be scheduled before any roster-touching write.
pub fn ensure_unlocked(game: &GameEntity) -> Result<(), RosterError> {
    if !game.status.is_scheduled() {
        return Err(RosterError::RosterLocked {
            status: game.status,
        });
    }
    Ok(())
}
