//! Shared application state: storage handles, degraded mode, category locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{club_store::ClubStore, student_store::StudentStore},
    error::ServiceError,
};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing backend handles and derived-cache locks.
///
/// Each store sits behind `RwLock<Option<…>>` so a supervisor can retract it
/// while the backend is unreachable; the service runs degraded until both
/// stores are installed.
pub struct AppState {
    club_store: RwLock<Option<Arc<dyn ClubStore>>>,
    student_store: RwLock<Option<Arc<dyn StudentStore>>>,
    config: AppConfig,
    degraded: watch::Sender<bool>,
    category_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until both backends are installed.
    pub fn new() -> SharedState {
        Self::with_config(AppConfig::default())
    }

    /// Construct the state with an explicit configuration.
    pub fn with_config(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            club_store: RwLock::new(None),
            student_store: RwLock::new(None),
            config,
            degraded: degraded_tx,
            category_locks: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the document store, if one is installed.
    pub async fn club_store(&self) -> Option<Arc<dyn ClubStore>> {
        self.club_store.read().await.as_ref().cloned()
    }

    /// Obtain the document store or fail with a degraded-mode error.
    pub async fn require_club_store(&self) -> Result<Arc<dyn ClubStore>, ServiceError> {
        self.club_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a document store backend.
    pub async fn install_club_store(&self, store: Arc<dyn ClubStore>) {
        {
            let mut guard = self.club_store.write().await;
            *guard = Some(store);
        }
        self.refresh_degraded().await;
    }

    /// Remove the document store backend and enter degraded mode.
    pub async fn clear_club_store(&self) {
        {
            let mut guard = self.club_store.write().await;
            guard.take();
        }
        self.refresh_degraded().await;
    }

    /// Obtain a handle to the relational store, if one is installed.
    pub async fn student_store(&self) -> Option<Arc<dyn StudentStore>> {
        self.student_store.read().await.as_ref().cloned()
    }

    /// Obtain the relational store or fail with a degraded-mode error.
    pub async fn require_student_store(&self) -> Result<Arc<dyn StudentStore>, ServiceError> {
        self.student_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a relational store backend.
    pub async fn install_student_store(&self, store: Arc<dyn StudentStore>) {
        {
            let mut guard = self.student_store.write().await;
            *guard = Some(store);
        }
        self.refresh_degraded().await;
    }

    /// Remove the relational store backend and enter degraded mode.
    pub async fn clear_student_store(&self) {
        {
            let mut guard = self.student_store.write().await;
            guard.take();
        }
        self.refresh_degraded().await;
    }

    /// Whether either backend is currently missing.
    pub async fn is_degraded(&self) -> bool {
        self.club_store.read().await.is_none() || self.student_store.read().await.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Per-category lock serializing membership mutations. The member cache
    /// is derived from a scan-then-write sequence, so concurrent link/unlink
    /// calls against one category must not interleave.
    pub fn category_lock(&self, category_id: Uuid) -> Arc<Mutex<()>> {
        self.category_locks
            .entry(category_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Broadcast the degraded flag when the value changes.
    async fn refresh_degraded(&self) {
        let value = self.is_degraded().await;
        if *self.degraded.borrow() != value {
            let _ = self.degraded.send(value);
        }
    }
}

/// State-side hooks the storage supervisor uses to publish or retract a
/// backend, implemented once per store kind.
pub trait StoreHost<S: ?Sized> {
    /// Publish a connected backend.
    fn install(&self, store: Arc<S>) -> impl Future<Output = ()> + Send;
    /// Retract the backend, entering degraded mode for that store.
    fn retract(&self) -> impl Future<Output = ()> + Send;
}

impl StoreHost<dyn ClubStore> for AppState {
    async fn install(&self, store: Arc<dyn ClubStore>) {
        self.install_club_store(store).await;
    }

    async fn retract(&self) {
        self.clear_club_store().await;
    }
}

impl StoreHost<dyn StudentStore> for AppState {
    async fn install(&self, store: Arc<dyn StudentStore>) {
        self.install_student_store(store).await;
    }

    async fn retract(&self) {
        self.clear_student_store().await;
    }
}
