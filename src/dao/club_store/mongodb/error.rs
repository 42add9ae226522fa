use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors raised by the MongoDB backend, one variant per operation so log
/// lines name the failing call site.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("failed to reach MongoDB after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save category `{id}`")]
    SaveCategory {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load category `{id}`")]
    LoadCategory {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to look up category named `{name}`")]
    LoadCategoryByName {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list categories")]
    ListCategories {
        #[source]
        source: MongoError,
    },
    #[error("failed to delete category `{id}`")]
    DeleteCategory {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to save training `{id}`")]
    SaveTraining {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load training `{id}`")]
    LoadTraining {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list trainings")]
    ListTrainings {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
}
