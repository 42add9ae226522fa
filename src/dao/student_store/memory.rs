//! In-process student store, used by the test suite and when the server
//! runs without a configured PostgreSQL instance.

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::StudentEntity,
    storage::{StorageResult, StoreHealth},
    student_store::StudentStore,
};

/// Student store holding everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryStudentStore {
    inner: Arc<RwLock<HashMap<Uuid, StudentEntity>>>,
}

impl MemoryStudentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StudentStore for MemoryStudentStore {
    fn save_student(&self, student: StudentEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.write().await.insert(student.id, student);
            Ok(())
        })
    }

    fn find_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StudentEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.get(&id).cloned()) })
    }

    fn list_students(&self) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut students: Vec<_> = store.inner.read().await.values().cloned().collect();
            students.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(students)
        })
    }

    fn delete_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.write().await.remove(&id).is_some()) })
    }

    fn find_by_category(
        &self,
        category_name: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>> {
        let store = self.clone();
        let category_name = category_name.to_owned();
        Box::pin(async move {
            let students = store.inner.read().await;
            let mut members: Vec<_> = students
                .values()
                .filter(|student| student.is_member_of(&category_name))
                .cloned()
                .collect();
            members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(members)
        })
    }

    fn rewrite_category(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        let old_name = old_name.to_owned();
        let new_name = new_name.to_owned();
        Box::pin(async move {
            // One critical section over the whole map keeps the rewrite
            // atomic with respect to every other store operation.
            let mut students = store.inner.write().await;
            let mut touched = 0;
            for student in students.values_mut() {
                if student.rename_category_refs(&old_name, &new_name) {
                    touched += 1;
                }
            }
            Ok(touched)
        })
    }
}

impl StoreHealth for MemoryStudentStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
