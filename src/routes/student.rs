use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::student::{CreateStudentRequest, StudentSummary, UpdateStudentRequest},
    error::AppError,
    services::student_service,
    state::SharedState,
};

/// Routes handling student records.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

/// List every student.
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    responses((status = 200, description = "All students", body = [StudentSummary]))
)]
pub async fn list_students(
    State(state): State<SharedState>,
) -> Result<Json<Vec<StudentSummary>>, AppError> {
    let students = student_service::list_students(&state).await?;
    Ok(Json(students))
}

/// Fetch one student.
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "The student", body = StudentSummary),
        (status = 404, description = "Unknown student")
    )
)]
pub async fn get_student(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentSummary>, AppError> {
    let student = student_service::get_student(&state, id).await?;
    Ok(Json(student))
}

/// Register a student.
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = CreateStudentRequest,
    responses((status = 200, description = "Student registered", body = StudentSummary))
)]
pub async fn create_student(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateStudentRequest>>,
) -> Result<Json<StudentSummary>, AppError> {
    let student = student_service::create_student(&state, payload).await?;
    Ok(Json(student))
}

/// Update a student, including the legacy category field path.
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student identifier")),
    request_body = UpdateStudentRequest,
    responses((status = 200, description = "Student updated", body = StudentSummary))
)]
pub async fn update_student(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateStudentRequest>>,
) -> Result<Json<StudentSummary>, AppError> {
    let student = student_service::update_student(&state, id, payload).await?;
    Ok(Json(student))
}

/// Delete a student and refresh affected category caches.
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student identifier")),
    responses((status = 204, description = "Student deleted"))
)]
pub async fn delete_student(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    student_service::delete_student(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
