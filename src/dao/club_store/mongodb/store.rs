use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoCategoryDocument, MongoGameDocument, MongoTrainingDocument, doc_id},
};
use crate::dao::{
    club_store::ClubStore,
    models::{CategoryEntity, GameEntity, GameListItemEntity, TrainingEntity},
    storage::{StorageResult, StoreHealth},
};

const CATEGORY_COLLECTION_NAME: &str = "categories";
const GAME_COLLECTION_NAME: &str = "games";
const TRAINING_COLLECTION_NAME: &str = "trainings";

/// Connection settings for the document store.
#[derive(Clone)]
pub struct MongoConfig {
    /// Parsed driver options.
    pub options: ClientOptions,
    /// Database the collections live in.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse a MongoDB URI, defaulting the database name when absent.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or("club_back").to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }
}

/// MongoDB-backed [`ClubStore`].
#[derive(Clone)]
pub struct MongoClubStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoClubStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        // Uniqueness backstop for the case-insensitive name rule enforced in
        // the service layer.
        let categories = database.collection::<MongoCategoryDocument>(CATEGORY_COLLECTION_NAME);
        let name_index = mongodb::IndexModel::builder()
            .keys(doc! {"name_lower": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("category_name_lower_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        categories
            .create_index(name_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CATEGORY_COLLECTION_NAME,
                index: "name_lower",
                source,
            })?;

        let games = database.collection::<MongoGameDocument>(GAME_COLLECTION_NAME);
        let game_index = mongodb::IndexModel::builder()
            .keys(doc! {"category": 1, "scheduled_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_category_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(game_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "category,scheduled_at",
                source,
            })?;

        let trainings = database.collection::<MongoTrainingDocument>(TRAINING_COLLECTION_NAME);
        let training_index = mongodb::IndexModel::builder()
            .keys(doc! {"category": 1, "scheduled_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("training_category_idx".to_owned()))
                    .build(),
            )
            .build();
        trainings
            .create_index(training_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: TRAINING_COLLECTION_NAME,
                index: "category,scheduled_at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn category_collection(&self) -> Collection<MongoCategoryDocument> {
        self.database()
            .await
            .collection::<MongoCategoryDocument>(CATEGORY_COLLECTION_NAME)
    }

    async fn game_collection(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn training_collection(&self) -> Collection<MongoTrainingDocument> {
        self.database()
            .await
            .collection::<MongoTrainingDocument>(TRAINING_COLLECTION_NAME)
    }

    async fn save_category(&self, category: CategoryEntity) -> MongoResult<()> {
        let id = category.id;
        let document: MongoCategoryDocument = category.into();
        self.category_collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveCategory { id, source })?;
        Ok(())
    }

    async fn find_category(&self, id: Uuid) -> MongoResult<Option<CategoryEntity>> {
        let document = self
            .category_collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadCategory { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn find_category_by_name(&self, name: String) -> MongoResult<Option<CategoryEntity>> {
        let document = self
            .category_collection()
            .await
            .find_one(doc! {"name_lower": name.to_lowercase()})
            .await
            .map_err(|source| MongoDaoError::LoadCategoryByName { name, source })?;
        Ok(document.map(Into::into))
    }

    async fn list_categories(&self) -> MongoResult<Vec<CategoryEntity>> {
        let documents: Vec<MongoCategoryDocument> = self
            .category_collection()
            .await
            .find(doc! {})
            .sort(doc! {"name_lower": 1})
            .await
            .map_err(|source| MongoDaoError::ListCategories { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCategories { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_category(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .category_collection()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteCategory { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.game_collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .game_collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn list_games(&self) -> MongoResult<Vec<GameListItemEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .game_collection()
            .await
            .find(doc! {})
            .sort(doc! {"scheduled_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(documents
            .into_iter()
            .map(|document| {
                let entity: GameEntity = document.into();
                entity.into()
            })
            .collect())
    }

    async fn save_training(&self, training: TrainingEntity) -> MongoResult<()> {
        let id = training.id;
        let document: MongoTrainingDocument = training.into();
        self.training_collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveTraining { id, source })?;
        Ok(())
    }

    async fn find_training(&self, id: Uuid) -> MongoResult<Option<TrainingEntity>> {
        let document = self
            .training_collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadTraining { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn list_trainings(&self) -> MongoResult<Vec<TrainingEntity>> {
        let documents: Vec<MongoTrainingDocument> = self
            .training_collection()
            .await
            .find(doc! {})
            .sort(doc! {"scheduled_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListTrainings { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListTrainings { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl ClubStore for MongoClubStore {
    fn save_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_category(category).await.map_err(Into::into) })
    }

    fn find_category(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_category(id).await.map_err(Into::into) })
    }

    fn find_category_by_name(
        &self,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>> {
        let store = self.clone();
        let name = name.to_owned();
        Box::pin(async move { store.find_category_by_name(name).await.map_err(Into::into) })
    }

    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_categories().await.map_err(Into::into) })
    }

    fn delete_category(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_category(id).await.map_err(Into::into) })
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn save_training(&self, training: TrainingEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_training(training).await.map_err(Into::into) })
    }

    fn find_training(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TrainingEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_training(id).await.map_err(Into::into) })
    }

    fn list_trainings(&self) -> BoxFuture<'static, StorageResult<Vec<TrainingEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_trainings().await.map_err(Into::into) })
    }
}

impl StoreHealth for MongoClubStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
