use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::database::entities::{
    project_notes, project_notes::Entity as ProjectNotes, users::Entity as Users,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::handlers::projects::ProjectNoteOut;
use crate::server::policy::require_project_read;

#[derive(Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    pub content: String,
}

async fn to_note_out(
    state: &AppState,
    note: project_notes::Model,
) -> Result<ProjectNoteOut, ApiError> {
    let author = Users::find_by_id(note.author_id).one(&state.db).await?;
    Ok(ProjectNoteOut {
        id: note.id,
        project_id: note.project_id,
        author_id: note.author_id,
        content: note.content,
        created_at: note.created_at,
        author_name: author.as_ref().map(|u| u.name.clone()),
        author_email: author.map(|u| u.email),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/notes",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note added", body = ProjectNoteOut),
        (status = 422, description = "Content is required")
    )
)]
pub async fn add_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<ProjectNoteOut>), ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::Unprocessable("Content is required".to_string()));
    }

    let note = project_notes::ActiveModel {
        project_id: Set(id),
        author_id: Set(user.id),
        content: Set(content.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let note = note.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(to_note_out(&state, note).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/notes",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Notes, newest first", body = [ProjectNoteOut])
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProjectNoteOut>>, ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let rows = ProjectNotes::find()
        .filter(project_notes::Column::ProjectId.eq(id))
        .order_by_desc(project_notes::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut notes = Vec::with_capacity(rows.len());
    for note in rows {
        notes.push(to_note_out(&state, note).await?);
    }
    Ok(Json(notes))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/notes/{note_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("note_id" = i32, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 403, description = "Permission denied"),
        (status = 404, description = "Note not found")
    )
)]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, note_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let project = require_project_read(&state.db, id, &user).await?;

    let note = ProjectNotes::find_by_id(note_id)
        .filter(project_notes::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    let is_author = note.author_id == user.id;
    let is_owner = project.owner_id == Some(user.id);
    let is_admin_or_pm = matches!(user.role.as_str(), "admin" | "pm");
    if !(is_author || is_owner || is_admin_or_pm) {
        return Err(ApiError::Forbidden("Permission denied".to_string()));
    }

    ProjectNotes::delete_by_id(note.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
