//! Data access layer: entities plus one narrow trait per backing store.

/// Category, game, and training storage (document store side).
pub mod club_store;
/// Database model definitions shared across layers.
pub mod models;
/// Storage abstraction shared by all backends.
pub mod storage;
/// Student storage (relational store side).
pub mod student_store;
