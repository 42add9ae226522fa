//! Backend-agnostic storage error and health contract.

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying engine.
#[derive(Debug, Error)]
#[error("storage unavailable: {message}")]
pub struct StorageError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl StorageError {
    /// Construct an error wrapping a backend failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Construct an error carrying only a message, for backends without a
    /// driver-level cause.
    pub fn message(message: impl Into<String>) -> Self {
        StorageError {
            message: message.into(),
            source: None,
        }
    }
}

/// Health and reconnection hooks shared by every store trait, used by the
/// storage supervisor regardless of which backend sits behind the handle.
pub trait StoreHealth: Send + Sync {
    /// Cheap liveness probe against the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
