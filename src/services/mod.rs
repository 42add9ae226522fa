//! Business logic invoked by the REST routes.

/// Category directory CRUD and rename propagation.
pub mod category_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle and roster mutations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Derived membership index over student records.
pub mod membership;
/// Write-time roster checks.
pub mod roster_validator;
/// Storage connection supervision.
pub mod storage_supervisor;
/// Student CRUD and the legacy category field path.
pub mod student_service;
/// Training session scheduling.
pub mod training_service;
