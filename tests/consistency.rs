//! End-to-end tests of the category / student / roster consistency rules,
//! driven through the service layer against the in-memory backends.

use std::sync::Arc;

use futures::future::BoxFuture;
use uuid::Uuid;

use club_back::{
    dao::{
        club_store::memory::MemoryClubStore,
        models::StudentEntity,
        storage::{StorageError, StorageResult, StoreHealth},
        student_store::{StudentStore, memory::MemoryStudentStore},
    },
    dto::{
        category::{
            CategorySummary, CreateCategoryRequest, LinkStudentsRequest, UpdateCategoryRequest,
        },
        game::{AddRosterEntryRequest, CreateGameRequest, RosterEntryInput},
        student::{CreateStudentRequest, StudentSummary, UpdateStudentRequest},
    },
    error::ServiceError,
    services::{
        category_service::{self, CategoryError},
        game_service, membership,
        roster_validator::{RosterError, RosterViolation},
        student_service,
    },
    state::{AppState, SharedState},
};

async fn test_state() -> SharedState {
    let state = AppState::new();
    state
        .install_club_store(Arc::new(MemoryClubStore::new()))
        .await;
    state
        .install_student_store(Arc::new(MemoryStudentStore::new()))
        .await;
    state
}

fn category_request(name: &str) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.into(),
        description: None,
        color: None,
        min_age: None,
        max_age: None,
        active: None,
    }
}

fn rename_request(new_name: &str) -> UpdateCategoryRequest {
    UpdateCategoryRequest {
        name: Some(new_name.into()),
        description: None,
        color: None,
        min_age: None,
        max_age: None,
    }
}

fn game_request(category: &str, student_ids: &[Uuid]) -> CreateGameRequest {
    CreateGameRequest {
        category: category.into(),
        opponent: Some("Visitantes FC".into()),
        location: None,
        scheduled_at: "2026-09-12T14:00:00Z".into(),
        roster: student_ids
            .iter()
            .map(|&student_id| RosterEntryInput {
                student_id,
                position: None,
            })
            .collect(),
    }
}

async fn create_category(state: &SharedState, name: &str) -> CategorySummary {
    category_service::create_category(state, category_request(name))
        .await
        .expect("category creation failed")
}

async fn create_student(
    state: &SharedState,
    name: &str,
    categories: &[&str],
    legacy: Option<&str>,
) -> StudentSummary {
    student_service::create_student(
        state,
        CreateStudentRequest {
            name: name.into(),
            categories: categories.iter().map(|c| (*c).to_owned()).collect(),
            category: legacy.map(str::to_owned),
        },
    )
    .await
    .expect("student creation failed")
}

#[tokio::test]
async fn recompute_is_idempotent() {
    let state = test_state().await;
    let category = create_category(&state, "Sub-10").await;
    create_student(&state, "Ana", &["Sub-10"], None).await;
    create_student(&state, "Bruno", &["Sub-10"], None).await;

    let first = membership::recompute(&state, category.id).await.unwrap();
    let second = membership::recompute(&state, category.id).await.unwrap();

    assert_eq!(first.member_count, 2);
    assert_eq!(first.member_ids, second.member_ids);
    assert_eq!(second.member_count, 2);
}

#[tokio::test]
async fn student_matching_both_fields_counts_once() {
    let state = test_state().await;
    let category = create_category(&state, "Sub-10").await;
    let student = create_student(&state, "Ana", &["Sub-10"], Some("Sub-10")).await;

    let fresh = membership::recompute(&state, category.id).await.unwrap();
    assert_eq!(fresh.member_count, 1);
    assert!(fresh.member_ids.contains(&student.id));
}

#[tokio::test]
async fn legacy_scalar_alone_grants_membership() {
    let state = test_state().await;
    let category = create_category(&state, "Sub-14").await;
    let student = create_student(&state, "Carla", &[], Some("Sub-14")).await;
    assert!(student.categories.is_empty());

    let fresh = membership::recompute(&state, category.id).await.unwrap();
    assert_eq!(fresh.member_count, 1);
}

#[tokio::test]
async fn rename_propagates_to_every_student() {
    let state = test_state().await;
    let category = create_category(&state, "Sub-10").await;
    let mut students = Vec::new();
    for name in ["Ana", "Bruno", "Carla", "Diego", "Elisa"] {
        students.push(create_student(&state, name, &["Sub-10"], None).await);
    }

    let renamed = category_service::update_category(&state, category.id, rename_request("Sub-11"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Sub-11");
    assert_eq!(renamed.member_count, 5);

    for student in &students {
        let fresh = student_service::get_student(&state, student.id).await.unwrap();
        assert_eq!(fresh.categories, vec!["Sub-11".to_owned()]);
        assert_eq!(fresh.category.as_deref(), Some("Sub-11"));
    }

    // The old name no longer resolves for new writes.
    let err = game_service::create_game(&state, game_request("Sub-10", &[]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::CategoryNotFound(name)) if name == "Sub-10"
    ));
}

/// Student store whose bulk rewrite always fails, everything else delegating
/// to the in-memory store.
#[derive(Clone)]
struct RewriteFailsStore {
    inner: MemoryStudentStore,
}

impl StudentStore for RewriteFailsStore {
    fn save_student(&self, student: StudentEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.save_student(student)
    }

    fn find_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StudentEntity>>> {
        self.inner.find_student(id)
    }

    fn list_students(&self) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>> {
        self.inner.list_students()
    }

    fn delete_student(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        self.inner.delete_student(id)
    }

    fn find_by_category(
        &self,
        category_name: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<StudentEntity>>> {
        self.inner.find_by_category(category_name)
    }

    fn rewrite_category(
        &self,
        _old_name: &str,
        _new_name: &str,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        Box::pin(async { Err(StorageError::message("simulated rewrite failure")) })
    }
}

impl StoreHealth for RewriteFailsStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.try_reconnect()
    }
}

#[tokio::test]
async fn failed_rename_leaves_category_and_students_untouched() {
    let state = AppState::new();
    state
        .install_club_store(Arc::new(MemoryClubStore::new()))
        .await;
    state
        .install_student_store(Arc::new(RewriteFailsStore {
            inner: MemoryStudentStore::new(),
        }))
        .await;

    let category = create_category(&state, "Sub-10").await;
    let mut students = Vec::new();
    for name in ["Ana", "Bruno", "Carla", "Diego", "Elisa"] {
        students.push(create_student(&state, name, &["Sub-10"], None).await);
    }

    let err = category_service::update_category(&state, category.id, rename_request("Sub-11"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable(_)));

    // The whole rename failed: directory and every student keep the old name.
    let fresh = category_service::get_category(&state, category.id).await.unwrap();
    assert_eq!(fresh.name, "Sub-10");
    for student in &students {
        let fresh = student_service::get_student(&state, student.id).await.unwrap();
        assert_eq!(fresh.categories, vec!["Sub-10".to_owned()]);
        assert_eq!(fresh.category.as_deref(), Some("Sub-10"));
    }
}

#[tokio::test]
async fn roster_rejects_cross_category_entries() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;
    create_category(&state, "Sub-12").await;
    let in_category = create_student(&state, "Ana", &["Sub-10"], None).await;
    let outsider = create_student(&state, "Bruno", &["Sub-12"], None).await;

    let err = game_service::create_game(&state, game_request("Sub-10", &[outsider.id]))
        .await
        .unwrap_err();
    match err {
        ServiceError::Roster(RosterError::Rejected { category, violations }) => {
            assert_eq!(category, "Sub-10");
            assert_eq!(
                violations,
                vec![RosterViolation::StudentNotInCategory {
                    student_id: outsider.id,
                    category: "Sub-10".into(),
                }]
            );
        }
        other => panic!("expected roster rejection, got {other:?}"),
    }

    let game = game_service::create_game(&state, game_request("Sub-10", &[in_category.id]))
        .await
        .unwrap();
    assert_eq!(game.roster.len(), 1);
}

#[tokio::test]
async fn roster_rejection_enumerates_every_violation() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;
    create_category(&state, "Sub-12").await;
    let outsider = create_student(&state, "Bruno", &["Sub-12"], None).await;
    let ghost = Uuid::new_v4();

    let err = game_service::create_game(&state, game_request("Sub-10", &[outsider.id, ghost]))
        .await
        .unwrap_err();
    match err {
        ServiceError::Roster(RosterError::Rejected { violations, .. }) => {
            assert_eq!(violations.len(), 2);
            assert!(violations.contains(&RosterViolation::StudentNotFound(ghost)));
            assert!(violations.contains(&RosterViolation::StudentNotInCategory {
                student_id: outsider.id,
                category: "Sub-10".into(),
            }));
        }
        other => panic!("expected roster rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn roster_add_and_remove_are_idempotent() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;
    let student = create_student(&state, "Ana", &["Sub-10"], None).await;
    let game = game_service::create_game(&state, game_request("Sub-10", &[]))
        .await
        .unwrap();

    for _ in 0..2 {
        let updated = game_service::add_roster_entry(
            &state,
            game.id,
            AddRosterEntryRequest {
                student_id: student.id,
                position: Some("goleiro".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.roster.len(), 1);
    }

    // Removing an absent student is a no-op, not an error.
    let absent = Uuid::new_v4();
    let after = game_service::remove_roster_entry(&state, game.id, absent)
        .await
        .unwrap();
    assert_eq!(after.roster.len(), 1);

    let after = game_service::remove_roster_entry(&state, game.id, student.id)
        .await
        .unwrap();
    assert!(after.roster.is_empty());
}

#[tokio::test]
async fn duplicate_roster_entries_collapse_on_creation() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;
    let student = create_student(&state, "Ana", &["Sub-10"], None).await;

    let game = game_service::create_game(&state, game_request("Sub-10", &[student.id, student.id]))
        .await
        .unwrap();
    assert_eq!(game.roster.len(), 1);
}

#[tokio::test]
async fn deletion_is_guarded_by_membership() {
    let state = test_state().await;
    let category = create_category(&state, "Sub-10").await;
    let student = create_student(&state, "Ana", &["Sub-10"], None).await;

    let err = category_service::delete_category(&state, category.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Category(CategoryError::HasMembers { count: 1 })
    ));

    category_service::unlink_student(&state, category.id, student.id)
        .await
        .unwrap();
    category_service::delete_category(&state, category.id)
        .await
        .unwrap();

    let err = category_service::get_category(&state, category.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Category(CategoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn category_names_are_unique_case_insensitively() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;

    let err = category_service::create_category(&state, category_request("sub-10"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Category(CategoryError::DuplicateName(_))
    ));

    let other = create_category(&state, "Sub-12").await;
    let err = category_service::update_category(&state, other.id, rename_request("SUB-10"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Category(CategoryError::DuplicateName(_))
    ));
}

#[tokio::test]
async fn deactivation_blocks_new_writes_but_not_existing_rosters() {
    let state = test_state().await;
    let category = create_category(&state, "Sub-10").await;
    let student = create_student(&state, "Ana", &["Sub-10"], None).await;
    let game = game_service::create_game(&state, game_request("Sub-10", &[student.id]))
        .await
        .unwrap();

    category_service::toggle_active(&state, category.id)
        .await
        .unwrap();

    // The existing roster is untouched; only the next write re-validates.
    let fresh = game_service::get_game(&state, game.id).await.unwrap();
    assert_eq!(fresh.roster.len(), 1);

    let err = game_service::create_game(&state, game_request("Sub-10", &[student.id]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::CategoryInactive(_))
    ));

    let err = game_service::add_roster_entry(
        &state,
        game.id,
        AddRosterEntryRequest {
            student_id: student.id,
            position: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::CategoryInactive(_))
    ));
}

#[tokio::test]
async fn finished_games_lock_their_roster() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;
    let student = create_student(&state, "Ana", &["Sub-10"], None).await;
    let game = game_service::create_game(&state, game_request("Sub-10", &[student.id]))
        .await
        .unwrap();

    game_service::finish_game(&state, game.id).await.unwrap();

    let err = game_service::add_roster_entry(
        &state,
        game.id,
        AddRosterEntryRequest {
            student_id: student.id,
            position: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::RosterLocked { .. })
    ));

    let err = game_service::remove_roster_entry(&state, game.id, student.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::RosterLocked { .. })
    ));

    // A finished game cannot be cancelled.
    let err = game_service::cancel_game(&state, game.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn unlink_updates_cache_and_legacy_scalar() {
    let state = test_state().await;
    let sub10 = create_category(&state, "Sub-10").await;
    let sub12 = create_category(&state, "Sub-12").await;
    let student = create_student(&state, "Ana", &[], None).await;

    category_service::link_students(
        &state,
        sub10.id,
        LinkStudentsRequest {
            student_ids: vec![student.id],
        },
    )
    .await
    .unwrap();
    let linked = category_service::link_students(
        &state,
        sub12.id,
        LinkStudentsRequest {
            student_ids: vec![student.id],
        },
    )
    .await
    .unwrap();
    assert_eq!(linked.member_count, 1);

    let fresh = student_service::get_student(&state, student.id).await.unwrap();
    assert_eq!(fresh.category.as_deref(), Some("Sub-10"));

    let after = category_service::unlink_student(&state, sub10.id, student.id)
        .await
        .unwrap();
    assert_eq!(after.member_count, 0);

    // Scalar falls back to the remaining membership.
    let fresh = student_service::get_student(&state, student.id).await.unwrap();
    assert_eq!(fresh.categories, vec!["Sub-12".to_owned()]);
    assert_eq!(fresh.category.as_deref(), Some("Sub-12"));
}

#[tokio::test]
async fn student_update_keeps_scalar_invariant() {
    let state = test_state().await;
    create_category(&state, "Sub-10").await;
    let sub12 = create_category(&state, "Sub-12").await;
    let student = create_student(&state, "Ana", &["Sub-10"], None).await;

    let updated = student_service::update_student(
        &state,
        student.id,
        UpdateStudentRequest {
            name: None,
            categories: Some(vec!["Sub-12".into()]),
            category: None,
        },
    )
    .await
    .unwrap();

    // The scalar followed the list replacement.
    assert_eq!(updated.categories, vec!["Sub-12".to_owned()]);
    assert_eq!(updated.category.as_deref(), Some("Sub-12"));

    let fresh = category_service::get_category(&state, sub12.id).await.unwrap();
    assert_eq!(fresh.member_count, 1);
}

#[tokio::test]
async fn full_category_lifecycle_scenario() {
    let state = test_state().await;

    // Category "Sub-8" with two linked students.
    let category = create_category(&state, "Sub-8").await;
    let a = create_student(&state, "Ana", &[], None).await;
    let b = create_student(&state, "Bruno", &[], None).await;
    let linked = category_service::link_students(
        &state,
        category.id,
        LinkStudentsRequest {
            student_ids: vec![a.id, b.id],
        },
    )
    .await
    .unwrap();
    assert_eq!(linked.member_count, 2);

    // Rename reaches both students.
    let renamed = category_service::update_category(&state, category.id, rename_request("Sub-9"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Sub-9");
    for id in [a.id, b.id] {
        let student = student_service::get_student(&state, id).await.unwrap();
        assert!(student.categories.contains(&"Sub-9".to_owned()));
        assert!(!student.categories.contains(&"Sub-8".to_owned()));
    }

    // A roster drawn from the membership passes; an unlinked student fails.
    let game = game_service::create_game(&state, game_request("Sub-9", &[a.id]))
        .await
        .unwrap();
    assert_eq!(game.category, "Sub-9");

    let c = create_student(&state, "Carla", &[], None).await;
    let err = game_service::create_game(&state, game_request("Sub-9", &[c.id]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::Rejected { .. })
    ));
}
