use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::database::entities::{
    project_members, project_members::Entity as ProjectMembers, users::Entity as Users,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::handlers::projects::ProjectMemberOut;
use crate::server::policy::require_project_read;

#[derive(Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: i32,
    pub role_in_project: Option<String>,
}

/// Clients send free-form roles; "member" and anything unknown become
/// contributor.
fn map_role(value: Option<&str>) -> &'static str {
    match value.unwrap_or("member").to_lowercase().as_str() {
        "owner" => "owner",
        "manager" => "manager",
        "viewer" => "viewer",
        _ => "contributor",
    }
}

async fn to_member_out(
    state: &AppState,
    member: project_members::Model,
) -> Result<ProjectMemberOut, ApiError> {
    let user = Users::find_by_id(member.user_id).one(&state.db).await?;
    Ok(ProjectMemberOut {
        id: member.id,
        project_id: member.project_id,
        user_id: member.user_id,
        role_in_project: member.role,
        joined_at: member.created_at,
        user_name: user.as_ref().map(|u| u.name.clone()),
        user_email: user.map(|u| u.email),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/members",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = ProjectMemberOut),
        (status = 409, description = "User already a member")
    )
)]
pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<ProjectMemberOut>), ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let exists = ProjectMembers::find()
        .filter(project_members::Column::ProjectId.eq(id))
        .filter(project_members::Column::UserId.eq(payload.user_id))
        .one(&state.db)
        .await?;
    if exists.is_some() {
        return Err(ApiError::Conflict("User already a member".to_string()));
    }

    let member = project_members::ActiveModel {
        project_id: Set(id),
        user_id: Set(payload.user_id),
        role: Set(map_role(payload.role_in_project.as_deref()).to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let member = member.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(to_member_out(&state, member).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/members",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project members", body = [ProjectMemberOut])
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProjectMemberOut>>, ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let rows = ProjectMembers::find()
        .filter(project_members::Column::ProjectId.eq(id))
        .all(&state.db)
        .await?;

    let mut members = Vec::with_capacity(rows.len());
    for member in rows {
        members.push(to_member_out(&state, member).await?);
    }
    Ok(Json(members))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/members/{member_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("member_id" = i32, Path, description = "Membership ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, member_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let member = ProjectMembers::find_by_id(member_id)
        .filter(project_members::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    ProjectMembers::delete_by_id(member.id)
        .exec(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
