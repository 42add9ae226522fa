//! Category directory: CRUD with name-uniqueness and lifecycle rules, plus
//! the rename propagation that keeps student records consistent.

use std::time::SystemTime;

use indexmap::IndexSet;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::CategoryEntity,
    dto::category::{
        CategorySummary, CreateCategoryRequest, LinkStudentsRequest, UpdateCategoryRequest,
    },
    error::ServiceError,
    services::membership,
    state::SharedState,
};

/// Violations of the category directory rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    /// Another category already holds the name, compared case-insensitively.
    #[error("a category named `{0}` already exists")]
    DuplicateName(String),
    /// No category matches the id.
    #[error("category `{0}` not found")]
    NotFound(Uuid),
    /// Deletion refused while students are still linked.
    #[error("category still has {count} linked student(s)")]
    HasMembers {
        /// Cached member count at the time of the call.
        count: u64,
    },
    /// The age bounds are inverted.
    #[error("minimum age {min} exceeds maximum age {max}")]
    InvalidAgeBounds {
        /// Requested minimum age.
        min: u8,
        /// Requested maximum age.
        max: u8,
    },
}

/// List every category, including the cached member counts.
pub async fn list_categories(state: &SharedState) -> Result<Vec<CategorySummary>, ServiceError> {
    let clubs = state.require_club_store().await?;
    let categories = clubs.list_categories().await?;
    Ok(categories.into_iter().map(Into::into).collect())
}

/// Fetch one category by id.
pub async fn get_category(
    state: &SharedState,
    id: Uuid,
) -> Result<CategorySummary, ServiceError> {
    let category = require_category(state, id).await?;
    Ok(category.into())
}

/// Create a category with an empty membership cache.
///
/// The display color falls back to the first palette entry not already used
/// by an existing category.
pub async fn create_category(
    state: &SharedState,
    request: CreateCategoryRequest,
) -> Result<CategorySummary, ServiceError> {
    let name = request.name.trim().to_owned();
    check_age_bounds(request.min_age, request.max_age)?;

    let clubs = state.require_club_store().await?;
    if clubs.find_category_by_name(&name).await?.is_some() {
        return Err(CategoryError::DuplicateName(name).into());
    }

    let color = match request.color {
        Some(color) => color,
        None => {
            let used: Vec<String> = clubs
                .list_categories()
                .await?
                .into_iter()
                .map(|category| category.color)
                .collect();
            state.config().first_unused_color(&used)
        }
    };

    let now = SystemTime::now();
    let category = CategoryEntity {
        id: Uuid::new_v4(),
        name,
        description: request.description,
        color,
        min_age: request.min_age,
        max_age: request.max_age,
        active: request.active.unwrap_or(true),
        member_ids: IndexSet::new(),
        member_count: 0,
        created_at: now,
        updated_at: now,
    };

    clubs.save_category(category.clone()).await?;
    info!(category = %category.name, id = %category.id, "created category");
    Ok(category.into())
}

/// Update a category's attributes. A name change propagates to every
/// affected student before the new name is committed (see
/// [`propagate_rename`]).
pub async fn update_category(
    state: &SharedState,
    id: Uuid,
    request: UpdateCategoryRequest,
) -> Result<CategorySummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut category = require_category(state, id).await?;

    let min_age = request.min_age.unwrap_or(category.min_age);
    let max_age = request.max_age.unwrap_or(category.max_age);
    check_age_bounds(min_age, max_age)?;
    category.min_age = min_age;
    category.max_age = max_age;

    if let Some(description) = request.description {
        category.description = description;
    }
    if let Some(color) = request.color {
        category.color = color;
    }

    let new_name = request
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty() && *name != category.name);

    match new_name {
        Some(name) => propagate_rename(state, category, name).await,
        None => {
            category.updated_at = SystemTime::now();
            clubs.save_category(category.clone()).await?;
            Ok(category.into())
        }
    }
}

/// Rename propagation: rewrite every student reference from the old name to
/// the new one, then commit the directory's name change.
///
/// The student-side rewrite is a single atomic store operation; if it fails
/// the category is left untouched, so there is never a mixed-name state. A
/// retry after a crash between the two steps converges because the rewrite
/// then matches zero students.
async fn propagate_rename(
    state: &SharedState,
    mut category: CategoryEntity,
    new_name: String,
) -> Result<CategorySummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let students = state.require_student_store().await?;

    if let Some(existing) = clubs.find_category_by_name(&new_name).await? {
        if existing.id != category.id {
            return Err(CategoryError::DuplicateName(new_name).into());
        }
    }

    let lock = state.category_lock(category.id);
    let _guard = lock.lock().await;

    let old_name = category.name.clone();
    let touched = students.rewrite_category(&old_name, &new_name).await?;

    category.name = new_name;
    category.updated_at = SystemTime::now();
    clubs.save_category(category.clone()).await?;

    info!(
        from = %old_name,
        to = %category.name,
        students = touched,
        "propagated category rename"
    );

    // Eager policy: refresh the cache against the new name before returning.
    let category = membership::recompute_locked(state, category.id).await?;
    Ok(category.into())
}

/// Flip the activity flag. Rosters of already-scheduled games are not
/// re-validated; only subsequent writes check the flag.
pub async fn toggle_active(
    state: &SharedState,
    id: Uuid,
) -> Result<CategorySummary, ServiceError> {
    let clubs = state.require_club_store().await?;
    let mut category = require_category(state, id).await?;

    category.active = !category.active;
    category.updated_at = SystemTime::now();
    clubs.save_category(category.clone()).await?;

    info!(category = %category.name, active = category.active, "toggled category");
    Ok(category.into())
}

/// Delete a category, refused while any student is still a member. Callers
/// wanting a fresh count recompute first.
pub async fn delete_category(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let clubs = state.require_club_store().await?;

    let lock = state.category_lock(id);
    let _guard = lock.lock().await;

    let category = require_category(state, id).await?;
    if category.member_count > 0 {
        return Err(CategoryError::HasMembers {
            count: category.member_count,
        }
        .into());
    }

    clubs.delete_category(id).await?;
    info!(category = %category.name, "deleted category");
    Ok(())
}

/// Link a batch of students to a category, then recompute its member cache.
pub async fn link_students(
    state: &SharedState,
    id: Uuid,
    request: LinkStudentsRequest,
) -> Result<CategorySummary, ServiceError> {
    let students = state.require_student_store().await?;
    let category = require_category(state, id).await?;

    let lock = state.category_lock(id);
    let _guard = lock.lock().await;

    let unique_ids: IndexSet<Uuid> = request.student_ids.into_iter().collect();
    for student_id in unique_ids {
        let Some(mut student) = students.find_student(student_id).await? else {
            return Err(ServiceError::NotFound(format!(
                "student `{student_id}` not found"
            )));
        };
        if student.link_category(&category.name) {
            students.save_student(student).await?;
        }
    }

    let category = membership::recompute_locked(state, id).await?;
    Ok(category.into())
}

/// Unlink one student from a category, then recompute its member cache.
/// Unlinking a student that is not a member is a no-op.
pub async fn unlink_student(
    state: &SharedState,
    id: Uuid,
    student_id: Uuid,
) -> Result<CategorySummary, ServiceError> {
    let students = state.require_student_store().await?;
    let category = require_category(state, id).await?;

    let lock = state.category_lock(id);
    let _guard = lock.lock().await;

    let Some(mut student) = students.find_student(student_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "student `{student_id}` not found"
        )));
    };
    if student.unlink_category(&category.name) {
        students.save_student(student).await?;
    }

    let category = membership::recompute_locked(state, id).await?;
    Ok(category.into())
}

async fn require_category(
    state: &SharedState,
    id: Uuid,
) -> Result<CategoryEntity, ServiceError> {
    let clubs = state.require_club_store().await?;
    clubs
        .find_category(id)
        .await?
        .ok_or_else(|| CategoryError::NotFound(id).into())
}

fn check_age_bounds(min_age: Option<u8>, max_age: Option<u8>) -> Result<(), CategoryError> {
    if let (Some(min), Some(max)) = (min_age, max_age) {
        if max < min {
            return Err(CategoryError::InvalidAgeBounds { min, max });
        }
    }
    Ok(())
}
