//! PostgreSQL implementation of the student store.

use futures::future::BoxFuture;
use sqlx::{
    FromRow, PgPool,
    postgres::PgPoolOptions,
    types::time::OffsetDateTime,
};
use uuid::Uuid;

use crate::dao::{
    models::StudentEntity,
    storage::{StorageError, StorageResult, StoreHealth},
    student_store::StudentStore,
};

/// Column list for student queries.
const COLUMNS: &str = "id, name, categories, category, created_at, updated_at";

/// PostgreSQL-backed [`StudentStore`] over a shared connection pool.
#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

/// Row shape of the `students` table.
#[derive(Debug, FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    categories: Vec<String>,
    category: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<StudentRow> for StudentEntity {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            categories: row.categories,
            category: row.category,
            created_at: row.created_at.into(),
            updated_at: row.updated_at.into(),
        }
    }
}

impl PgStudentStore {
    /// Connect to PostgreSQL and ensure the `students` table exists.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(|source| StorageError::unavailable("connecting to PostgreSQL", source))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> StorageResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS students (
                 id UUID PRIMARY KEY,
                 name TEXT NOT NULL,
                 categories TEXT[] NOT NULL DEFAULT '{}',
                 category TEXT,
                 created_at TIMESTAMPTZ NOT NULL,
                 updated_at TIMESTAMPTZ NOT NULL
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|source| StorageError::unavailable("ensuring students table", source))?;
        Ok(())
    }

    async fn save_student(&self, student: StudentEntity) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO students (id, name, categories, category, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 categories = EXCLUDED.categories,
                 category = EXCLUDED.category,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(student.id)
        .bind(&student.name)
        .bind(&student.categories)
        .bind(&student.category)
        .bind(OffsetDateTime::from(student.created_at))
        .bind(OffsetDateTime::from(student.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|source| StorageError::unavailable("saving student", source))?;
        Ok(())
    }

    async fn find_student(&self, id: Uuid) -> StorageResult<Option<StudentEntity>> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        let row = sqlx::query_as::<_, StudentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| StorageError::unavailable("loading student", source))?;
        Ok(row.map(Into::into))
    }

    async fn list_students(&self) -> StorageResult<Vec<StudentEntity>> {
        let query = format!("SELECT {COLUMNS} FROM students ORDER BY name, id");
        let rows = sqlx::query_as::<_, StudentRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| StorageError::unavailable("listing students", source))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_student(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|source| StorageError::unavailable("deleting student", source))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_category(&self, category_name: String) -> StorageResult<Vec<StudentEntity>> {
        // Union over both membership fields; a student matching both is one row.
        let query = format!(
            "SELECT {COLUMNS} FROM students
             WHERE $1 = ANY(categories) OR category = $1
             ORDER BY name, id"
        );
        let rows = sqlx::query_as::<_, StudentRow>(&query)
            .bind(&category_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| StorageError::unavailable("scanning category members", source))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn rewrite_category(&self, old_name: String, new_name: String) -> StorageResult<u64> {
        // A single statement, so the rewrite commits or rolls back as one
        // unit; there is no partially renamed state to observe.
        let result = sqlx::query(
            "UPDATE students SET
                 categories = array_replace(categories, $1, $2),
                 category = CASE WHEN category = $1 THEN $2 ELSE category END,
                 updated_at = NOW()
             WHERE $1 = ANY(categories) OR category = $1",
        )
        .bind(&old_name)
        .bind(&new_name)
        .execute(&self.pool)
        .await
        .map_err(|source| StorageError::unavailable("rewriting category references", source))?;
        Ok(result.rows_affected())
    }
}

impl StudentStore for PgStudentStore {
    fn save_student(&self, student: StudentEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_student(student).await })
    }

    fn find_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StudentEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_student(id).await })
    }

    fn list_students(&self) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_students().await })
    }

    fn delete_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_student(id).await })
    }

    fn find_by_category(
        &self,
        category_name: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>> {
        let store = self.clone();
        let category_name = category_name.to_owned();
        Box::pin(async move { store.find_by_category(category_name).await })
    }

    fn rewrite_category(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        let old_name = old_name.to_owned();
        let new_name = new_name.to_owned();
        Box::pin(async move { store.rewrite_category(old_name, new_name).await })
    }
}

impl StoreHealth for PgStudentStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&store.pool)
                .await
                .map_err(|source| StorageError::unavailable("PostgreSQL health ping", source))?;
            Ok(())
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // The pool re-establishes connections on demand; a successful probe
        // is equivalent to a reconnect.
        self.health_check()
    }
}
