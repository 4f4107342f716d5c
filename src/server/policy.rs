//! Project access checks shared by the handlers.
//!
//! Read access: admin, project owner, or project member. Manage access:
//! admin or owner. Unknown project is always 404 before any 403.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::database::entities::{
    project_members, project_members::Entity as ProjectMembers, projects,
    projects::Entity as Projects, users,
};
use crate::server::error::ApiError;

pub async fn require_project_read(
    db: &DatabaseConnection,
    project_id: i32,
    user: &users::Model,
) -> Result<projects::Model, ApiError> {
    let project = Projects::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if user.is_admin() || project.owner_id == Some(user.id) || is_member(db, project_id, user.id).await? {
        return Ok(project);
    }

    Err(ApiError::Forbidden("No access to this project".to_string()))
}

pub async fn require_project_manage(
    db: &DatabaseConnection,
    project_id: i32,
    user: &users::Model,
) -> Result<projects::Model, ApiError> {
    let project = require_project_read(db, project_id, user).await?;
    if user.is_admin() || project.owner_id == Some(user.id) {
        return Ok(project);
    }
    Err(ApiError::Forbidden(
        "Only admin/owner can modify this project".to_string(),
    ))
}

pub async fn is_member(
    db: &DatabaseConnection,
    project_id: i32,
    user_id: i32,
) -> Result<bool, ApiError> {
    let membership = ProjectMembers::find()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .filter(project_members::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(membership.is_some())
}
