//! Entities persisted by the storage layer and shared across layers.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Category record persisted in the document store.
///
/// `member_ids` and `member_count` are a derived cache over student records;
/// they are rewritten by membership recomputation and never edited by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntity {
    /// Stable identifier for the category.
    pub id: Uuid,
    /// Display name, unique among categories when compared case-insensitively.
    pub name: String,
    /// Free-form description shown in the admin UI.
    pub description: Option<String>,
    /// Display color as a `#rrggbb` string.
    pub color: String,
    /// Minimum age admitted into the category, if bounded.
    pub min_age: Option<u8>,
    /// Maximum age admitted into the category, if bounded.
    pub max_age: Option<u8>,
    /// Soft activity flag; inactive categories refuse new games and trainings.
    pub active: bool,
    /// Cached identifiers of the students currently belonging to the category.
    pub member_ids: IndexSet<Uuid>,
    /// Cached size of `member_ids`.
    pub member_count: u64,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the category was updated.
    pub updated_at: SystemTime,
}

impl CategoryEntity {
    /// Replace the cached membership view with a freshly scanned one.
    pub fn set_members(&mut self, member_ids: IndexSet<Uuid>) {
        self.member_count = member_ids.len() as u64;
        self.member_ids = member_ids;
        self.updated_at = SystemTime::now();
    }
}

/// Student record persisted in the relational store.
///
/// Membership is carried twice: the `categories` list is the current model,
/// and the `category` scalar is a legacy single-value field older UI paths
/// still read and write. The scalar is kept consistent with the list by the
/// link/unlink operations below, but a scalar written by a legacy path that
/// bypasses the list entirely is preserved as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentEntity {
    /// Stable identifier for the student.
    pub id: Uuid,
    /// Full display name.
    pub name: String,
    /// Names of the categories the student belongs to, in link order.
    pub categories: Vec<String>,
    /// Legacy single-category field.
    pub category: Option<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the student record was updated.
    pub updated_at: SystemTime,
}

impl StudentEntity {
    /// Whether the student belongs to `category_name` through either field.
    ///
    /// A student matching both fields counts once; comparison is exact, since
    /// stored references are copies of the canonical category name.
    pub fn is_member_of(&self, category_name: &str) -> bool {
        self.categories.iter().any(|name| name == category_name)
            || self.category.as_deref() == Some(category_name)
    }

    /// Add `category_name` to the membership list if absent, seeding the
    /// legacy scalar when it is unset. Returns whether anything changed.
    pub fn link_category(&mut self, category_name: &str) -> bool {
        let mut changed = false;

        if !self.categories.iter().any(|name| name == category_name) {
            self.categories.push(category_name.to_owned());
            changed = true;
        }

        if self.category.is_none() {
            self.category = Some(category_name.to_owned());
            changed = true;
        }

        if changed {
            self.updated_at = SystemTime::now();
        }
        changed
    }

    /// Remove `category_name` from the membership list. When the legacy
    /// scalar pointed at the removed name it falls back to the first
    /// remaining list entry, or becomes unset when none remain. Returns
    /// whether anything changed.
    pub fn unlink_category(&mut self, category_name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|name| name != category_name);
        let mut changed = self.categories.len() != before;

        if self.category.as_deref() == Some(category_name) {
            self.category = self.categories.first().cloned();
            changed = true;
        }

        if changed {
            self.updated_at = SystemTime::now();
        }
        changed
    }

    /// Rewrite every reference to `old_name` (list entries and the legacy
    /// scalar) to `new_name`. Returns whether anything changed.
    pub fn rename_category_refs(&mut self, old_name: &str, new_name: &str) -> bool {
        let mut changed = false;

        for name in &mut self.categories {
            if name == old_name {
                new_name.clone_into(name);
                changed = true;
            }
        }

        if self.category.as_deref() == Some(old_name) {
            self.category = Some(new_name.to_owned());
            changed = true;
        }

        if changed {
            self.updated_at = SystemTime::now();
        }
        changed
    }
}

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// The game is upcoming; its roster may still be edited.
    Scheduled,
    /// The game has been played to completion.
    Finished,
    /// The game was called off before being played.
    Cancelled,
}

impl GameStatus {
    /// Whether the roster and game fields may still be edited.
    pub fn is_scheduled(self) -> bool {
        matches!(self, GameStatus::Scheduled)
    }

    /// Whether the status may transition to `next`. Only a scheduled game
    /// moves anywhere; in particular a finished game cannot be cancelled.
    pub fn can_become(self, next: GameStatus) -> bool {
        matches!(
            (self, next),
            (GameStatus::Scheduled, GameStatus::Finished)
                | (GameStatus::Scheduled, GameStatus::Cancelled)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Finished => "finished",
            GameStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// One roster slot of a game: a student reference plus an optional position tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntryEntity {
    /// Student occupying the slot.
    pub student_id: Uuid,
    /// Optional position tag (e.g. "goleiro").
    pub position: Option<String>,
}

/// Game record persisted in the document store.
///
/// `category` is a denormalized name string, not a foreign key: a game keeps
/// the name it was created under even if the category is later renamed, and
/// every write is validated against the directory as it is at that moment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Stable identifier for the game.
    pub id: Uuid,
    /// Name of the category the game is played under.
    pub category: String,
    /// Opposing team, free text.
    pub opponent: Option<String>,
    /// Venue, free text.
    pub location: Option<String>,
    /// Kick-off time.
    pub scheduled_at: SystemTime,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Ordered roster; every entry belongs to `category` at write time.
    pub roster: Vec<RosterEntryEntity>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game was updated.
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Whether `student_id` already occupies a roster slot.
    pub fn roster_contains(&self, student_id: Uuid) -> bool {
        self.roster
            .iter()
            .any(|entry| entry.student_id == student_id)
    }

    /// Append a roster entry unless the student is already present.
    /// Duplicate adds are an idempotent no-op, not a failure.
    pub fn add_roster_entry(&mut self, entry: RosterEntryEntity) -> bool {
        if self.roster_contains(entry.student_id) {
            return false;
        }
        self.roster.push(entry);
        self.updated_at = SystemTime::now();
        true
    }

    /// Remove every roster entry referencing `student_id`. Removing an
    /// absent student is a no-op, not an error.
    pub fn remove_roster_entry(&mut self, student_id: Uuid) -> bool {
        let before = self.roster.len();
        self.roster.retain(|entry| entry.student_id != student_id);
        let changed = self.roster.len() != before;
        if changed {
            self.updated_at = SystemTime::now();
        }
        changed
    }
}

/// Training session record persisted in the document store.
///
/// Shares the denormalized category-name convention with [`GameEntity`] but
/// carries no roster, hence no membership checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingEntity {
    /// Stable identifier for the training session.
    pub id: Uuid,
    /// Name of the category the session is scheduled for.
    pub category: String,
    /// Session start time.
    pub scheduled_at: SystemTime,
    /// Venue, free text.
    pub location: Option<String>,
    /// Coach notes, free text.
    pub notes: Option<String>,
    /// Whether the session has been called off.
    pub cancelled: bool,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the training was updated.
    pub updated_at: SystemTime,
}

/// Game list item (subset of [`GameEntity`]) returned by listing queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameListItemEntity {
    /// Stable identifier for the game.
    pub id: Uuid,
    /// Name of the category the game is played under.
    pub category: String,
    /// Opposing team, free text.
    pub opponent: Option<String>,
    /// Kick-off time.
    pub scheduled_at: SystemTime,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Number of roster slots currently filled.
    pub roster_size: usize,
}

impl From<GameEntity> for GameListItemEntity {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            category: entity.category,
            opponent: entity.opponent,
            scheduled_at: entity.scheduled_at,
            status: entity.status,
            roster_size: entity.roster.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(categories: &[&str], category: Option<&str>) -> StudentEntity {
        StudentEntity {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            categories: categories.iter().map(|name| (*name).to_owned()).collect(),
            category: category.map(str::to_owned),
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    #[test]
    fn membership_is_the_union_of_both_fields() {
        let by_list = student(&["Sub-10"], None);
        let by_scalar = student(&[], Some("Sub-10"));
        let by_both = student(&["Sub-10"], Some("Sub-10"));
        let neither = student(&["Sub-12"], Some("Sub-14"));

        assert!(by_list.is_member_of("Sub-10"));
        assert!(by_scalar.is_member_of("Sub-10"));
        assert!(by_both.is_member_of("Sub-10"));
        assert!(!neither.is_member_of("Sub-10"));
    }

    #[test]
    fn link_seeds_the_legacy_scalar_once() {
        let mut s = student(&[], None);

        assert!(s.link_category("Sub-10"));
        assert_eq!(s.categories, vec!["Sub-10"]);
        assert_eq!(s.category.as_deref(), Some("Sub-10"));

        assert!(s.link_category("Sub-12"));
        assert_eq!(s.categories, vec!["Sub-10", "Sub-12"]);
        // Scalar stays on the first linked category.
        assert_eq!(s.category.as_deref(), Some("Sub-10"));
    }

    #[test]
    fn link_is_idempotent() {
        let mut s = student(&["Sub-10"], Some("Sub-10"));
        assert!(!s.link_category("Sub-10"));
        assert_eq!(s.categories, vec!["Sub-10"]);
    }

    #[test]
    fn unlink_moves_the_scalar_to_the_first_remaining_entry() {
        let mut s = student(&["Sub-10", "Sub-12"], Some("Sub-10"));

        assert!(s.unlink_category("Sub-10"));
        assert_eq!(s.categories, vec!["Sub-12"]);
        assert_eq!(s.category.as_deref(), Some("Sub-12"));
    }

    #[test]
    fn unlink_of_the_last_category_unsets_the_scalar() {
        let mut s = student(&["Sub-10"], Some("Sub-10"));

        assert!(s.unlink_category("Sub-10"));
        assert!(s.categories.is_empty());
        assert!(s.category.is_none());
    }

    #[test]
    fn unlink_of_an_absent_category_is_a_no_op() {
        let mut s = student(&["Sub-10"], Some("Sub-10"));
        assert!(!s.unlink_category("Sub-12"));
        assert_eq!(s.categories, vec!["Sub-10"]);
        assert_eq!(s.category.as_deref(), Some("Sub-10"));
    }

    #[test]
    fn legacy_scalar_set_without_a_list_entry_is_preserved() {
        // Older UI paths write the scalar directly; unlinking an unrelated
        // name must not "repair" it.
        let mut s = student(&["Sub-12"], Some("Sub-14"));
        s.unlink_category("Sub-12");
        assert_eq!(s.category.as_deref(), Some("Sub-14"));
    }

    #[test]
    fn rename_rewrites_both_fields() {
        let mut s = student(&["Sub-10", "Sub-12"], Some("Sub-10"));

        assert!(s.rename_category_refs("Sub-10", "Sub-11"));
        assert_eq!(s.categories, vec!["Sub-11", "Sub-12"]);
        assert_eq!(s.category.as_deref(), Some("Sub-11"));
    }

    #[test]
    fn rename_without_matching_refs_reports_no_change() {
        let mut s = student(&["Sub-12"], Some("Sub-12"));
        assert!(!s.rename_category_refs("Sub-10", "Sub-11"));
    }

    #[test]
    fn only_scheduled_games_transition() {
        assert!(GameStatus::Scheduled.can_become(GameStatus::Finished));
        assert!(GameStatus::Scheduled.can_become(GameStatus::Cancelled));
        assert!(!GameStatus::Finished.can_become(GameStatus::Cancelled));
        assert!(!GameStatus::Cancelled.can_become(GameStatus::Finished));
        assert!(!GameStatus::Finished.can_become(GameStatus::Finished));
    }

    #[test]
    fn duplicate_roster_add_is_a_no_op() {
        let student_id = Uuid::new_v4();
        let mut game = GameEntity {
            id: Uuid::new_v4(),
            category: "Sub-10".into(),
            opponent: None,
            location: None,
            scheduled_at: SystemTime::now(),
            status: GameStatus::Scheduled,
            roster: Vec::new(),
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        };

        assert!(game.add_roster_entry(RosterEntryEntity {
            student_id,
            position: None,
        }));
        assert!(!game.add_roster_entry(RosterEntryEntity {
            student_id,
            position: Some("goleiro".into()),
        }));
        assert_eq!(game.roster.len(), 1);

        assert!(game.remove_roster_entry(student_id));
        assert!(!game.remove_roster_entry(student_id));
        assert!(game.roster.is_empty());
    }
}
