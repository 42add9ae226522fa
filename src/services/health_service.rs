//! Health check service.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the current health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.club_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "document store health check failed");
            }
        }
        None => warn!("document store unavailable (degraded mode)"),
    }

    match state.student_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "relational store health check failed");
            }
        }
        None => warn!("relational store unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
