//! Membership index: the derived view of which students belong to a category.
//!
//! Student records are the source of truth; the member-id set and count
//! cached on each category are recomputed from them, never edited directly.

use indexmap::IndexSet;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::models::CategoryEntity,
    error::ServiceError,
    services::category_service::CategoryError,
    state::SharedState,
};

/// Outcome of probing one student's membership in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberCheck {
    /// The student belongs to the category through either field.
    Member,
    /// The student exists but does not belong to the category.
    NotMember,
    /// No student record matches the id.
    UnknownStudent,
}

/// Evaluate the membership predicate for a single student without a full
/// recompute. Used by the roster validator for cheap per-entry checks.
pub async fn check_member(
    state: &SharedState,
    student_id: Uuid,
    category_name: &str,
) -> Result<MemberCheck, ServiceError> {
    let students = state.require_student_store().await?;
    let outcome = match students.find_student(student_id).await? {
        Some(student) if student.is_member_of(category_name) => MemberCheck::Member,
        Some(_) => MemberCheck::NotMember,
        None => MemberCheck::UnknownStudent,
    };
    Ok(outcome)
}

/// Rebuild a category's cached member set and count from the student records,
/// serialized behind the per-category lock. Idempotent; zero members is a
/// valid result.
pub async fn recompute(
    state: &SharedState,
    category_id: Uuid,
) -> Result<CategoryEntity, ServiceError> {
    let lock = state.category_lock(category_id);
    let _guard = lock.lock().await;
    recompute_locked(state, category_id).await
}

/// Recompute body for callers that already hold the category lock.
pub(crate) async fn recompute_locked(
    state: &SharedState,
    category_id: Uuid,
) -> Result<CategoryEntity, ServiceError> {
    let clubs = state.require_club_store().await?;
    let students = state.require_student_store().await?;

    let Some(mut category) = clubs.find_category(category_id).await? else {
        return Err(CategoryError::NotFound(category_id).into());
    };

    let members = students.find_by_category(&category.name).await?;
    let member_ids: IndexSet<Uuid> = members.into_iter().map(|student| student.id).collect();

    debug!(
        category = %category.name,
        count = member_ids.len(),
        "recomputed category membership"
    );

    category.set_members(member_ids);
    clubs.save_category(category.clone()).await?;
    Ok(category)
}

/// Eagerly recompute every category named in `names` that currently exists.
/// Names that resolve to no category (legacy references) are skipped.
pub(crate) async fn recompute_for_names<I>(state: &SharedState, names: I) -> Result<(), ServiceError>
where
    I: IntoIterator<Item = String>,
{
    let clubs = state.require_club_store().await?;

    let mut seen = IndexSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        match clubs.find_category_by_name(&name).await? {
            Some(category) => {
                recompute(state, category.id).await?;
            }
            None => {
                debug!(category = %name, "skipping recompute for unknown category reference");
            }
        }
    }

    Ok(())
}
