//! In-process document store, used by the test suite and when the server
//! runs without a configured MongoDB instance.

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    club_store::ClubStore,
    models::{CategoryEntity, GameEntity, GameListItemEntity, TrainingEntity},
    storage::{StorageResult, StoreHealth},
};

/// Document store holding everything in process memory. Contents are lost on
/// shutdown; health checks and reconnects always succeed.
#[derive(Clone, Default)]
pub struct MemoryClubStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    categories: RwLock<HashMap<Uuid, CategoryEntity>>,
    games: RwLock<HashMap<Uuid, GameEntity>>,
    trainings: RwLock<HashMap<Uuid, TrainingEntity>>,
}

impl MemoryClubStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClubStore for MemoryClubStore {
    fn save_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .categories
                .write()
                .await
                .insert(category.id, category);
            Ok(())
        })
    }

    fn find_category(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.categories.read().await.get(&id).cloned()) })
    }

    fn find_category_by_name(
        &self,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>> {
        let store = self.clone();
        let needle = name.to_lowercase();
        Box::pin(async move {
            let categories = store.inner.categories.read().await;
            Ok(categories
                .values()
                .find(|category| category.name.to_lowercase() == needle)
                .cloned())
        })
    }

    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut categories: Vec<_> =
                store.inner.categories.read().await.values().cloned().collect();
            categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            Ok(categories)
        })
    }

    fn delete_category(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.categories.write().await.remove(&id).is_some()) })
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.games.write().await.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.games.read().await.get(&id).cloned()) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut games: Vec<GameListItemEntity> = store
                .inner
                .games
                .read()
                .await
                .values()
                .cloned()
                .map(Into::into)
                .collect();
            games.sort_by_key(|game| game.scheduled_at);
            Ok(games)
        })
    }

    fn save_training(&self, training: TrainingEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .trainings
                .write()
                .await
                .insert(training.id, training);
            Ok(())
        })
    }

    fn find_training(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TrainingEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.trainings.read().await.get(&id).cloned()) })
    }

    fn list_trainings(&self) -> BoxFuture<'static, StorageResult<Vec<TrainingEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut trainings: Vec<_> =
                store.inner.trainings.read().await.values().cloned().collect();
            trainings.sort_by_key(|training| training.scheduled_at);
            Ok(trainings)
        })
    }
}

impl StoreHealth for MemoryClubStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
