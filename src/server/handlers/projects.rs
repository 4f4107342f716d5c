use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::entities::{
    departments::Entity as Departments, project_members,
    project_members::Entity as ProjectMembers, project_notes,
    project_notes::Entity as ProjectNotes, projects, projects::Entity as Projects,
    users::Entity as Users,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::policy::{require_project_manage, require_project_read};

const PROJECT_STATUSES: [&str; 5] = ["Idea", "Planning", "Executing", "Monitoring", "Closed"];
const PROJECT_PRIORITIES: [&str; 3] = ["High", "Medium", "Normal"];

/// Accepts "planning" as well as "Planning"; returns the canonical form.
pub fn parse_status(value: &str) -> Result<&'static str, ApiError> {
    let lowered = value.trim().to_lowercase();
    PROJECT_STATUSES
        .iter()
        .find(|candidate| candidate.to_lowercase() == lowered)
        .copied()
        .ok_or_else(|| ApiError::Validation(format!("Invalid status: {value}")))
}

pub fn parse_priority(value: &str) -> Result<&'static str, ApiError> {
    let lowered = value.trim().to_lowercase();
    PROJECT_PRIORITIES
        .iter()
        .find(|candidate| candidate.to_lowercase() == lowered)
        .copied()
        .ok_or_else(|| ApiError::Validation(format!("Invalid priority: {value}")))
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().len() < 3 || title.len() > 200 {
        return Err(ApiError::Validation(
            "Title must be between 3 and 200 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_progress(progress: i32) -> Result<(), ApiError> {
    if !(0..=100).contains(&progress) {
        return Err(ApiError::Validation(
            "Progress must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub title: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub progress: Option<i32>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub department_id: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub progress: Option<i32>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize)]
pub struct ListProjectsParams {
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectSummaryOut {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub progress: i32,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub department_name: Option<String>,
    pub owner_name: Option<String>,
    pub member_count: u64,
    pub is_overdue: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectMemberOut {
    pub id: i32,
    pub project_id: i32,
    pub user_id: i32,
    pub role_in_project: String,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectNoteOut {
    pub id: i32,
    pub project_id: i32,
    pub author_id: i32,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectDetailOut {
    #[serde(flatten)]
    pub project: projects::Model,
    pub members: Vec<ProjectMemberOut>,
    pub notes: Vec<ProjectNoteOut>,
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = projects::Model),
        (status = 400, description = "Invalid status, priority, or title")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<projects::Model>, ApiError> {
    validate_title(&payload.title)?;
    let status = match &payload.status {
        Some(value) => parse_status(value)?,
        None => "Planning",
    };
    let priority = match &payload.priority {
        Some(value) => parse_priority(value)?,
        None => "Normal",
    };
    let progress = payload.progress.unwrap_or(0);
    validate_progress(progress)?;

    let department_id = payload.department_id.or(user.department_id);

    let project = projects::ActiveModel {
        title: Set(payload.title),
        status: Set(status.to_string()),
        priority: Set(priority.to_string()),
        progress: Set(progress),
        owner_id: Set(Some(user.id)),
        department_id: Set(department_id),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        created_at: Set(Utc::now()),
        total_budget: Set(0.0),
        spent_amount: Set(0.0),
        ..Default::default()
    };
    let project = project.insert(&state.db).await?;

    // the creator joins their own project as owner
    let member = project_members::ActiveModel {
        project_id: Set(project.id),
        user_id: Set(user.id),
        role: Set("owner".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    member.insert(&state.db).await?;

    Ok(Json(project))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Caller's projects", body = [projects::Model])
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListProjectsParams>,
) -> Result<Json<Vec<projects::Model>>, ApiError> {
    let mut query = Projects::find();
    if !user.is_admin() {
        query = query.filter(projects::Column::OwnerId.eq(user.id));
    }
    if let Some(status) = &params.status {
        query = query.filter(projects::Column::Status.eq(parse_status(status)?));
    }

    let projects = query.all(&state.db).await?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/overview",
    responses(
        (status = 200, description = "Dashboard summaries", body = [ProjectSummaryOut])
    )
)]
pub async fn projects_overview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ProjectSummaryOut>>, ApiError> {
    let projects = if user.is_admin() {
        Projects::find().all(&state.db).await?
    } else {
        // every project the caller belongs to, not only owned ones
        let memberships = ProjectMembers::find()
            .filter(project_members::Column::UserId.eq(user.id))
            .all(&state.db)
            .await?;
        let ids: Vec<i32> = memberships.iter().map(|m| m.project_id).collect();
        Projects::find()
            .filter(projects::Column::Id.is_in(ids))
            .all(&state.db)
            .await?
    };

    let now = Utc::now();
    let mut summaries = Vec::with_capacity(projects.len());
    for project in projects {
        let owner_name = match project.owner_id {
            Some(owner_id) => Users::find_by_id(owner_id)
                .one(&state.db)
                .await?
                .map(|u| u.name),
            None => None,
        };

        let member_count = ProjectMembers::find()
            .filter(project_members::Column::ProjectId.eq(project.id))
            .count(&state.db)
            .await?;

        let department_name = match project.department_id {
            Some(department_id) => Departments::find_by_id(department_id)
                .one(&state.db)
                .await?
                .map(|d| d.name),
            None => None,
        };

        let is_overdue = project
            .end_date
            .map(|end| project.status != "Closed" && end < now)
            .unwrap_or(false);

        summaries.push(ProjectSummaryOut {
            id: project.id,
            title: project.title,
            status: project.status,
            progress: project.progress,
            start_date: project.start_date,
            end_date: project.end_date,
            department_name,
            owner_name,
            member_count,
            is_overdue,
        });
    }

    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = projects::Model),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<projects::Model>, ApiError> {
    let project = require_project_read(&state.db, id, &user).await?;
    Ok(Json(project))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = projects::Model),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<projects::Model>, ApiError> {
    let project = require_project_manage(&state.db, id, &user).await?;

    let mut project: projects::ActiveModel = project.into();
    if let Some(title) = payload.title {
        validate_title(&title)?;
        project.title = Set(title);
    }
    if let Some(status) = payload.status {
        project.status = Set(parse_status(&status)?.to_string());
    }
    if let Some(priority) = payload.priority {
        project.priority = Set(parse_priority(&priority)?.to_string());
    }
    if let Some(progress) = payload.progress {
        validate_progress(progress)?;
        project.progress = Set(progress);
    }
    if let Some(start_date) = payload.start_date {
        project.start_date = Set(Some(start_date));
    }
    if let Some(end_date) = payload.end_date {
        project.end_date = Set(Some(end_date));
    }

    let project = project.update(&state.db).await?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 403, description = "Only admin/owner can delete"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let project = require_project_read(&state.db, id, &user).await?;

    let allowed = if user.is_admin() || project.owner_id == Some(user.id) {
        true
    } else {
        ProjectMembers::find()
            .filter(project_members::Column::ProjectId.eq(id))
            .filter(project_members::Column::UserId.eq(user.id))
            .filter(project_members::Column::Role.eq("owner"))
            .one(&state.db)
            .await?
            .is_some()
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "Only admin/owner can delete".to_string(),
        ));
    }

    Projects::delete_by_id(project.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/detail",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project with members and notes", body = ProjectDetailOut),
        (status = 404, description = "Project not found")
    )
)]
pub async fn project_detail(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ProjectDetailOut>, ApiError> {
    let project = require_project_read(&state.db, id, &user).await?;

    let member_rows = ProjectMembers::find()
        .filter(project_members::Column::ProjectId.eq(id))
        .find_also_related(Users)
        .all(&state.db)
        .await?;
    let members = member_rows
        .into_iter()
        .map(|(member, joined)| ProjectMemberOut {
            id: member.id,
            project_id: member.project_id,
            user_id: member.user_id,
            role_in_project: member.role,
            joined_at: member.created_at,
            user_name: joined.as_ref().map(|u| u.name.clone()),
            user_email: joined.map(|u| u.email),
        })
        .collect();

    let note_rows = ProjectNotes::find()
        .filter(project_notes::Column::ProjectId.eq(id))
        .order_by_desc(project_notes::Column::CreatedAt)
        .find_also_related(Users)
        .all(&state.db)
        .await?;
    let notes = note_rows
        .into_iter()
        .map(|(note, author)| ProjectNoteOut {
            id: note.id,
            project_id: note.project_id,
            author_id: note.author_id,
            content: note.content,
            created_at: note.created_at,
            author_name: author.as_ref().map(|u| u.name.clone()),
            author_email: author.map(|u| u.email),
        })
        .collect();

    Ok(Json(ProjectDetailOut {
        project,
        members,
        notes,
    }))
}
