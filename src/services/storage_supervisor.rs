//! Keeps a storage backend connected, retracting it from the shared state
//! while it is unreachable so the service degrades instead of failing.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::storage::{StorageError, StoreHealth},
    state::{AppState, SharedState, StoreHost},
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to a storage backend, publish it into the shared state, and keep
/// polling its health; works for any store kind the state can host.
pub async fn run<S, C, Fut>(state: SharedState, backend: &'static str, mut connect: C)
where
    S: StoreHealth + ?Sized + 'static,
    AppState: StoreHost<S>,
    C: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<Arc<S>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                <AppState as StoreHost<S>>::install(state.as_ref(), store.clone()).await;
                info!(backend, "storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                poll_health(&state, backend, store).await;

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(backend, error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll until the backend becomes unreachable and cannot be revived, leaving
/// the store retracted when giving up.
async fn poll_health<S>(state: &SharedState, backend: &'static str, store: Arc<S>)
where
    S: StoreHealth + ?Sized + 'static,
    AppState: StoreHost<S>,
{
    loop {
        match store.health_check().await {
            Ok(()) => sleep(HEALTH_POLL_INTERVAL).await,
            Err(err) => {
                warn!(backend, error = %err, "storage health check failed; entering degraded mode");
                <AppState as StoreHost<S>>::retract(state.as_ref()).await;

                let mut attempt = 0;
                let mut reconnect_delay = INITIAL_DELAY;
                let mut reconnected = false;

                while attempt < MAX_RECONNECT_ATTEMPTS {
                    match store.try_reconnect().await {
                        Ok(()) => {
                            reconnected = true;
                            break;
                        }
                        Err(reconnect_err) => {
                            warn!(
                                backend,
                                attempt,
                                error = %reconnect_err,
                                "storage reconnect attempt failed"
                            );
                            attempt += 1;
                            sleep(reconnect_delay).await;
                            reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                        }
                    }
                }

                if reconnected {
                    <AppState as StoreHost<S>>::install(state.as_ref(), store.clone()).await;
                    info!(backend, "storage reconnection succeeded; leaving degraded mode");
                } else {
                    warn!(backend, "exhausted storage reconnect attempts; staying in degraded mode");
                    return;
                }
            }
        }
    }
}
