use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::MAX_UPLOAD_BYTES;
use crate::database::entities::{
    project_files, project_files::Entity as ProjectFiles, users::Entity as Users,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::policy::{require_project_manage, require_project_read};

#[derive(Serialize, ToSchema)]
pub struct ProjectFileOut {
    pub id: i32,
    pub project_id: i32,
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub uploader_name: Option<String>,
}

async fn to_file_out(
    state: &AppState,
    file: project_files::Model,
) -> Result<ProjectFileOut, ApiError> {
    let uploader_name = match file.uploader_id {
        Some(uploader_id) => Users::find_by_id(uploader_id)
            .one(&state.db)
            .await?
            .map(|u| u.name),
        None => None,
    };
    Ok(ProjectFileOut {
        id: file.id,
        project_id: file.project_id,
        filename: file.filename,
        content_type: file.content_type,
        size_bytes: file.size_bytes,
        created_at: file.created_at,
        uploader_name,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/files",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Files, newest first", body = [ProjectFileOut])
    )
)]
pub async fn list_files(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProjectFileOut>>, ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let rows = ProjectFiles::find()
        .filter(project_files::Column::ProjectId.eq(id))
        .order_by_desc(project_files::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut files = Vec::with_capacity(rows.len());
    for file in rows {
        files.push(to_file_out(&state, file).await?);
    }
    Ok(Json(files))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/files",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 201, description = "File stored", body = ProjectFileOut),
        (status = 400, description = "No file field in the upload"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProjectFileOut>), ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Malformed multipart body".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        filename = field.file_name().map(|name| name.to_string());
        content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("Malformed multipart body".to_string()))?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge(
                "File too large (max 20MB)".to_string(),
            ));
        }
        bytes = Some(data.to_vec());
    }

    let bytes = bytes.ok_or_else(|| ApiError::Validation("Missing 'file' field".to_string()))?;
    let filename = filename.unwrap_or_else(|| "upload.bin".to_string());

    let project_dir = state.config.upload_dir.join("projects").join(id.to_string());
    tokio::fs::create_dir_all(&project_dir)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let stored_path = project_dir.join(Uuid::new_v4().simple().to_string());
    tokio::fs::write(&stored_path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let file = project_files::ActiveModel {
        project_id: Set(id),
        uploader_id: Set(Some(user.id)),
        filename: Set(filename),
        stored_path: Set(stored_path.to_string_lossy().into_owned()),
        content_type: Set(content_type),
        size_bytes: Set(Some(bytes.len() as i64)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let file = file.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(to_file_out(&state, file).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/files/{file_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("file_id" = i32, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 404, description = "File not found"),
        (status = 410, description = "Blob missing on disk")
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let file = ProjectFiles::find_by_id(file_id)
        .filter(project_files::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let bytes = tokio::fs::read(&file.stored_path)
        .await
        .map_err(|_| ApiError::Gone("File missing on server".to_string()))?;

    let mut headers = HeaderMap::new();
    let content_type = file
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!("attachment; filename=\"{}\"", sanitize_filename(&file.filename));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    Ok((headers, bytes))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/files/{file_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("file_id" = i32, Path, description = "File ID")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let file = ProjectFiles::find_by_id(file_id)
        .filter(project_files::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    ProjectFiles::delete_by_id(file.id).exec(&state.db).await?;

    // the row is gone either way; a stray blob only wastes disk
    if let Err(err) = tokio::fs::remove_file(&file.stored_path).await {
        warn!(%err, path = %file.stored_path, "could not remove stored file");
    }

    Ok(StatusCode::NO_CONTENT)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}
