use axum::Router;

use crate::state::SharedState;

/// Category directory endpoints.
pub mod category;
/// OpenAPI documentation endpoints.
pub mod docs;
/// Game and roster endpoints.
pub mod game;
/// Health check endpoints.
pub mod health;
/// Student endpoints.
pub mod student;
/// Training session endpoints.
pub mod training;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(category::router())
        .merge(student::router())
        .merge(game::router())
        .merge(training::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
