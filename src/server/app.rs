use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, MAX_UPLOAD_BYTES};
use super::handlers::{
    auth, budget, files, health, members, notes, phase_details, phases, projects, tasks,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        projects::create_project,
        projects::list_projects,
        projects::projects_overview,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        projects::project_detail,
        phases::list_phases,
        phases::create_phase,
        phases::update_phase,
        phases::reorder_phases,
        phases::delete_phase,
        phase_details::list_phase_details,
        phase_details::get_phase_tree,
        phase_details::create_phase_detail,
        phase_details::update_phase_detail,
        phase_details::delete_phase_detail,
        phase_details::list_detail_notes,
        phase_details::create_detail_note,
        tasks::list_tasks,
        tasks::create_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::reorder_tasks,
        members::add_member,
        members::list_members,
        members::remove_member,
        notes::add_note,
        notes::list_notes,
        notes::delete_note,
        budget::get_budget,
        budget::set_budget,
        budget::add_expense,
        budget::list_expenses,
        budget::delete_expense,
        files::list_files,
        files::upload_file,
        files::download_file,
        files::delete_file,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::UserOut,
        auth::LoginRequest,
        auth::Token,
        projects::CreateProjectRequest,
        projects::UpdateProjectRequest,
        projects::ProjectSummaryOut,
        projects::ProjectMemberOut,
        projects::ProjectNoteOut,
        projects::ProjectDetailOut,
        phases::CreatePhaseRequest,
        phases::UpdatePhaseRequest,
        phases::ReorderPhasesRequest,
        phase_details::CreateDetailRequest,
        phase_details::UpdateDetailRequest,
        phase_details::CreateDetailNoteRequest,
        tasks::CreateTaskRequest,
        tasks::UpdateTaskRequest,
        tasks::ReorderTasksRequest,
        members::AddMemberRequest,
        notes::CreateNoteRequest,
        budget::SetBudgetRequest,
        budget::CreateExpenseRequest,
        budget::BudgetSummaryOut,
        files::ProjectFileOut,
        crate::database::entities::projects::Model,
        crate::database::entities::project_phases::Model,
        crate::database::entities::phase_details::Model,
        crate::database::entities::phase_detail_notes::Model,
        crate::database::entities::phase_tasks::Model,
        crate::database::entities::project_expenses::Model,
        crate::tree::TreeNode,
        crate::tree::ItemType,
        crate::progress::PhaseStatus,
    ))
)]
pub struct ApiDoc;

pub async fn create_app(
    db: DatabaseConnection,
    config: Config,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState {
        db,
        config: Arc::new(config),
    };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // Swagger UI documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Project routes
        .route("/projects", post(projects::create_project))
        .route("/projects", get(projects::list_projects))
        .route("/projects/overview", get(projects::projects_overview))
        .route("/projects/:id", get(projects::get_project))
        .route("/projects/:id", patch(projects::update_project))
        .route("/projects/:id", delete(projects::delete_project))
        .route("/projects/:id/detail", get(projects::project_detail))
        // Phase routes
        .route("/projects/:id/phases", get(phases::list_phases))
        .route("/projects/:id/phases", post(phases::create_phase))
        .route("/projects/:id/phases/reorder", post(phases::reorder_phases))
        .route("/projects/:id/phases/:phase_id", patch(phases::update_phase))
        .route("/projects/:id/phases/:phase_id", delete(phases::delete_phase))
        // Phase task routes
        .route(
            "/projects/:id/phases/:phase_id/tasks",
            get(tasks::list_tasks),
        )
        .route(
            "/projects/:id/phases/:phase_id/tasks",
            post(tasks::create_task),
        )
        .route(
            "/projects/:id/phases/:phase_id/tasks/reorder",
            post(tasks::reorder_tasks),
        )
        .route("/projects/:id/tasks/:task_id", patch(tasks::update_task))
        .route("/projects/:id/tasks/:task_id", delete(tasks::delete_task))
        // Member routes
        .route("/projects/:id/members", post(members::add_member))
        .route("/projects/:id/members", get(members::list_members))
        .route(
            "/projects/:id/members/:member_id",
            delete(members::remove_member),
        )
        // Note routes
        .route("/projects/:id/notes", post(notes::add_note))
        .route("/projects/:id/notes", get(notes::list_notes))
        .route("/projects/:id/notes/:note_id", delete(notes::delete_note))
        // Budget routes
        .route("/projects/:id/budget", get(budget::get_budget))
        .route("/projects/:id/budget", put(budget::set_budget))
        .route("/projects/:id/expenses", post(budget::add_expense))
        .route("/projects/:id/expenses", get(budget::list_expenses))
        .route(
            "/projects/:id/expenses/:expense_id",
            delete(budget::delete_expense),
        )
        // File routes
        .route("/projects/:id/files", get(files::list_files))
        .route("/projects/:id/files", post(files::upload_file))
        .route("/projects/:id/files/:file_id", get(files::download_file))
        .route("/projects/:id/files/:file_id", delete(files::delete_file))
        // Phase detail (task tree) routes
        .route(
            "/phase-details/phase/:phase_id",
            get(phase_details::list_phase_details),
        )
        .route(
            "/phase-details/phase/:phase_id/tree",
            get(phase_details::get_phase_tree),
        )
        .route("/phase-details", post(phase_details::create_phase_detail))
        .route(
            "/phase-details/:detail_id",
            put(phase_details::update_phase_detail),
        )
        .route(
            "/phase-details/:detail_id",
            delete(phase_details::delete_phase_detail),
        )
        .route(
            "/phase-details/:detail_id/notes",
            get(phase_details::list_detail_notes),
        )
        .route(
            "/phase-details/:detail_id/notes",
            post(phase_details::create_detail_note),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}
