//! Student CRUD, including the legacy single-category write path.
//!
//! Every mutation that touches a student's category fields eagerly
//! recomputes the member cache of each affected category that exists;
//! references to unknown names (legacy data) are left alone.

use std::time::SystemTime;

use indexmap::IndexSet;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::StudentEntity,
    dto::student::{CreateStudentRequest, StudentSummary, UpdateStudentRequest},
    error::ServiceError,
    services::membership,
    state::SharedState,
};

/// List every student.
pub async fn list_students(state: &SharedState) -> Result<Vec<StudentSummary>, ServiceError> {
    let students = state.require_student_store().await?;
    Ok(students
        .list_students()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Fetch one student by id.
pub async fn get_student(state: &SharedState, id: Uuid) -> Result<StudentSummary, ServiceError> {
    let student = require_student(state, id).await?;
    Ok(student.into())
}

/// Register a student. When a category list is given without the legacy
/// scalar, the scalar is seeded with the first entry; a scalar given alone
/// is stored verbatim (legacy UI path).
pub async fn create_student(
    state: &SharedState,
    request: CreateStudentRequest,
) -> Result<StudentSummary, ServiceError> {
    let students = state.require_student_store().await?;

    let categories = clean_names(request.categories);
    let category = request
        .category
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .or_else(|| categories.first().cloned());

    let now = SystemTime::now();
    let student = StudentEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_owned(),
        categories,
        category,
        created_at: now,
        updated_at: now,
    };

    students.save_student(student.clone()).await?;
    info!(student = %student.name, id = %student.id, "registered student");

    membership::recompute_for_names(state, referenced_names(&student)).await?;
    Ok(student.into())
}

/// Update a student. Category-field semantics:
///
/// - a provided `categories` list replaces the old one; the legacy scalar
///   follows the unlink fallback when the entry it pointed at disappears,
///   and is seeded with the first entry when it was unset;
/// - a provided `category` value is written verbatim afterwards, preserving
///   the legacy path's ability to set a scalar the list never carried.
pub async fn update_student(
    state: &SharedState,
    id: Uuid,
    request: UpdateStudentRequest,
) -> Result<StudentSummary, ServiceError> {
    let students = state.require_student_store().await?;
    let mut student = require_student(state, id).await?;

    let mut affected: Vec<String> = referenced_names(&student);

    if let Some(name) = request.name {
        student.name = name.trim().to_owned();
    }

    if let Some(new_list) = request.categories {
        let scalar_was_in_list = student
            .category
            .as_ref()
            .is_some_and(|scalar| student.categories.contains(scalar));

        student.categories = clean_names(new_list);

        // Seed an unset scalar, or let it fall back when the entry it pointed
        // at disappeared; a bypass scalar the list never carried is preserved.
        let needs_fallback = match &student.category {
            None => true,
            Some(scalar) => scalar_was_in_list && !student.categories.contains(scalar),
        };
        if needs_fallback {
            student.category = student.categories.first().cloned();
        }
    }

    if let Some(scalar) = request.category {
        student.category = scalar
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
    }

    student.updated_at = SystemTime::now();
    students.save_student(student.clone()).await?;

    affected.extend(referenced_names(&student));
    membership::recompute_for_names(state, affected).await?;
    Ok(student.into())
}

/// Remove a student and refresh every category they referenced.
pub async fn delete_student(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let students = state.require_student_store().await?;
    let student = require_student(state, id).await?;

    students.delete_student(id).await?;
    info!(student = %student.name, id = %student.id, "deleted student");

    membership::recompute_for_names(state, referenced_names(&student)).await?;
    Ok(())
}

async fn require_student(state: &SharedState, id: Uuid) -> Result<StudentEntity, ServiceError> {
    let students = state.require_student_store().await?;
    students
        .find_student(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("student `{id}` not found")))
}

/// Trim, drop empties, and dedupe while preserving first-seen order.
fn clean_names(names: Vec<String>) -> Vec<String> {
    let unique: IndexSet<String> = names
        .into_iter()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect();
    unique.into_iter().collect()
}

fn referenced_names(student: &StudentEntity) -> Vec<String> {
    let mut names = student.categories.clone();
    names.extend(student.category.clone());
    names
}
