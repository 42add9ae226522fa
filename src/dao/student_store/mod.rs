//! Relational-store abstraction for student records.

/// In-memory backend used for tests and storage-less local development.
pub mod memory;
#[cfg(feature = "postgres-store")]
/// PostgreSQL backend.
pub mod postgres;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::StudentEntity;
use crate::dao::storage::{StorageResult, StoreHealth};

/// Abstraction over the persistence layer for student records.
///
/// Membership scans and the rename rewrite live here because the student
/// records are the source of truth for category membership; the dual-field
/// representation never leaks past this trait and the entity methods.
pub trait StudentStore: StoreHealth + Send + Sync {
    /// Upsert a student record, replacing any previous state.
    fn save_student(&self, student: StudentEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a student by id.
    fn find_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StudentEntity>>>;
    /// List every student.
    fn list_students(&self) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>>;
    /// Delete a student by id, reporting whether a record was removed.
    fn delete_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Every student belonging to `category_name` through either membership
    /// field (union; a student matching both counts once).
    fn find_by_category(
        &self,
        category_name: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>>;
    /// Rewrite every reference to `old_name` to `new_name` across all
    /// students, atomically with respect to other store operations. Returns
    /// the number of students touched.
    fn rewrite_category(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> BoxFuture<'static, StorageResult<u64>>;
}
