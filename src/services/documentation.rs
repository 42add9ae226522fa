use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for club-back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::category::list_categories,
        crate::routes::category::get_category,
        crate::routes::category::create_category,
        crate::routes::category::update_category,
        crate::routes::category::delete_category,
        crate::routes::category::toggle_active,
        crate::routes::category::recompute_members,
        crate::routes::category::link_students,
        crate::routes::category::unlink_student,
        crate::routes::student::list_students,
        crate::routes::student::get_student,
        crate::routes::student::create_student,
        crate::routes::student::update_student,
        crate::routes::student::delete_student,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::create_game,
        crate::routes::game::update_game,
        crate::routes::game::finish_game,
        crate::routes::game::cancel_game,
        crate::routes::game::add_roster_entry,
        crate::routes::game::remove_roster_entry,
        crate::routes::training::list_trainings,
        crate::routes::training::get_training,
        crate::routes::training::schedule_training,
        crate::routes::training::cancel_training,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::category::CreateCategoryRequest,
            crate::dto::category::UpdateCategoryRequest,
            crate::dto::category::LinkStudentsRequest,
            crate::dto::category::CategorySummary,
            crate::dto::student::CreateStudentRequest,
            crate::dto::student::UpdateStudentRequest,
            crate::dto::student::StudentSummary,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::AddRosterEntryRequest,
            crate::dto::game::RosterEntryInput,
            crate::dto::game::RosterEntrySummary,
            crate::dto::game::GameSummary,
            crate::dto::game::GameListItem,
            crate::dto::training::CreateTrainingRequest,
            crate::dto::training::TrainingSummary,
            crate::dao::models::GameStatus,
        )
    ),
    tags(
        (name = "categories", description = "Category directory and membership cache"),
        (name = "students", description = "Student records"),
        (name = "games", description = "Games and rosters"),
        (name = "trainings", description = "Training sessions"),
    )
)]
pub struct ApiDoc;
