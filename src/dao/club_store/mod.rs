//! Document-store abstraction for categories, games, and trainings.

/// In-memory backend used for tests and storage-less local development.
pub mod memory;
#[cfg(feature = "mongo-store")]
/// MongoDB backend.
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{CategoryEntity, GameEntity, GameListItemEntity, TrainingEntity};
use crate::dao::storage::{StorageResult, StoreHealth};

/// Abstraction over the persistence layer for categories, games, and
/// training sessions.
pub trait ClubStore: StoreHealth + Send + Sync {
    /// Upsert a category record, replacing any previous state.
    fn save_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a category by id.
    fn find_category(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>>;
    /// Fetch a category by name, compared case-insensitively. The returned
    /// entity carries the canonical name as stored.
    fn find_category_by_name(
        &self,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>>;
    /// List every category.
    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>>;
    /// Delete a category by id, reporting whether a record was removed.
    fn delete_category(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Upsert a game record, replacing any previous state.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// List every game as a summary item.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>>;

    /// Upsert a training record, replacing any previous state.
    fn save_training(&self, training: TrainingEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a training by id.
    fn find_training(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TrainingEntity>>>;
    /// List every training session.
    fn list_trainings(&self) -> BoxFuture<'static, StorageResult<Vec<TrainingEntity>>>;
}
