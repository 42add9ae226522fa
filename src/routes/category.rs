use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::category::{
        CategorySummary, CreateCategoryRequest, LinkStudentsRequest, UpdateCategoryRequest,
    },
    error::AppError,
    services::{category_service, membership},
    state::SharedState,
};

/// Routes handling the category directory and its membership cache.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/categories/{id}/active", post(toggle_active))
        .route("/categories/{id}/recompute", post(recompute_members))
        .route("/categories/{id}/students", post(link_students))
        .route(
            "/categories/{id}/students/{student_id}",
            delete(unlink_student),
        )
}

/// List every category, including cached member counts.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses((status = 200, description = "All categories", body = [CategorySummary]))
)]
pub async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let categories = category_service::list_categories(&state).await?;
    Ok(Json(categories))
}

/// Fetch one category.
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "The category", body = CategorySummary),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn get_category(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = category_service::get_category(&state, id).await?;
    Ok(Json(category))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategorySummary),
        (status = 409, description = "Duplicate name")
    )
)]
pub async fn create_category(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateCategoryRequest>>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = category_service::create_category(&state, payload).await?;
    Ok(Json(category))
}

/// Update a category; a name change propagates to every linked student.
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategorySummary),
        (status = 409, description = "Duplicate name")
    )
)]
pub async fn update_category(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateCategoryRequest>>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = category_service::update_category(&state, id, payload).await?;
    Ok(Json(category))
}

/// Delete a category; refused while students are still linked.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 409, description = "Category still has members")
    )
)]
pub async fn delete_category(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    category_service::delete_category(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the activity flag.
#[utoipa::path(
    post,
    path = "/categories/{id}/active",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses((status = 200, description = "Flag toggled", body = CategorySummary))
)]
pub async fn toggle_active(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = category_service::toggle_active(&state, id).await?;
    Ok(Json(category))
}

/// Recompute the cached member set and count from the student records.
#[utoipa::path(
    post,
    path = "/categories/{id}/recompute",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses((status = 200, description = "Fresh membership view", body = CategorySummary))
)]
pub async fn recompute_members(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = membership::recompute(&state, id).await?;
    Ok(Json(category.into()))
}

/// Link a batch of students to the category.
#[utoipa::path(
    post,
    path = "/categories/{id}/students",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    request_body = LinkStudentsRequest,
    responses((status = 200, description = "Students linked", body = CategorySummary))
)]
pub async fn link_students(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<LinkStudentsRequest>>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = category_service::link_students(&state, id, payload).await?;
    Ok(Json(category))
}

/// Unlink one student from the category.
#[utoipa::path(
    delete,
    path = "/categories/{id}/students/{student_id}",
    tag = "categories",
    params(
        ("id" = Uuid, Path, description = "Category identifier"),
        ("student_id" = Uuid, Path, description = "Student identifier")
    ),
    responses((status = 200, description = "Student unlinked", body = CategorySummary))
)]
pub async fn unlink_student(
    State(state): State<SharedState>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CategorySummary>, AppError> {
    let category = category_service::unlink_student(&state, id, student_id).await?;
    Ok(Json(category))
}
