use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::database::entities::{
    project_phases, project_phases::Entity as ProjectPhases,
};
use crate::progress::PhaseStatus;
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::policy::{require_project_manage, require_project_read};
use crate::services::ProgressService;

fn parse_phase_status(value: &str) -> Result<PhaseStatus, ApiError> {
    PhaseStatus::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Invalid phase status: {value}")))
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePhaseRequest {
    pub name: String,
    pub sort_order: Option<i32>,
    pub status: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePhaseRequest {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub status: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReorderPhasesRequest {
    pub ordered_ids: Vec<i32>,
}

async fn phases_of(state: &AppState, project_id: i32) -> Result<Vec<project_phases::Model>, ApiError> {
    Ok(ProjectPhases::find()
        .filter(project_phases::Column::ProjectId.eq(project_id))
        .order_by_asc(project_phases::Column::SortOrder)
        .order_by_asc(project_phases::Column::Id)
        .all(&state.db)
        .await?)
}

fn next_sort(phases: &[project_phases::Model]) -> i32 {
    phases.iter().map(|p| p.sort_order).max().unwrap_or(0) + 1
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/phases",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Phases in display order", body = [project_phases::Model]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_phases(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<project_phases::Model>>, ApiError> {
    require_project_read(&state.db, id, &user).await?;
    Ok(Json(phases_of(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/phases",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreatePhaseRequest,
    responses(
        (status = 201, description = "Phase created", body = project_phases::Model),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create_phase(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreatePhaseRequest>,
) -> Result<(StatusCode, Json<project_phases::Model>), ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let existing = phases_of(&state, id).await?;
    // an occupied sort slot falls back to end-of-list instead of colliding
    let sort_order = match payload.sort_order {
        Some(desired) if !existing.iter().any(|p| p.sort_order == desired) => desired,
        Some(_) => next_sort(&existing),
        None => next_sort(&existing),
    };

    let status = match &payload.status {
        Some(value) => parse_phase_status(value)?,
        None => PhaseStatus::NotStarted,
    };

    let phase = project_phases::ActiveModel {
        project_id: Set(id),
        name: Set(payload.name),
        sort_order: Set(sort_order),
        status: Set(status.as_str().to_string()),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let phase = phase.insert(&state.db).await?;

    // a new phase shifts the unweighted mean
    ProgressService::new(state.db.clone()).push_project(id).await;

    Ok((StatusCode::CREATED, Json(phase)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}/phases/{phase_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("phase_id" = i32, Path, description = "Phase ID")
    ),
    request_body = UpdatePhaseRequest,
    responses(
        (status = 200, description = "Phase updated", body = project_phases::Model),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn update_phase(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, phase_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdatePhaseRequest>,
) -> Result<Json<project_phases::Model>, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let phase = ProjectPhases::find_by_id(phase_id)
        .filter(project_phases::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phase not found".to_string()))?;

    let status_changed = payload.status.is_some();

    let mut phase: project_phases::ActiveModel = phase.into();
    if let Some(name) = payload.name {
        phase.name = Set(name);
    }
    if let Some(sort_order) = payload.sort_order {
        phase.sort_order = Set(sort_order);
    }
    if let Some(status) = payload.status {
        phase.status = Set(parse_phase_status(&status)?.as_str().to_string());
    }
    if let Some(start_date) = payload.start_date {
        phase.start_date = Set(Some(start_date));
    }
    if let Some(end_date) = payload.end_date {
        phase.end_date = Set(Some(end_date));
    }

    let phase = phase.update(&state.db).await?;

    if status_changed {
        // a done phase contributes 100 regardless of its tasks
        ProgressService::new(state.db.clone()).push_project(id).await;
    }

    Ok(Json(phase))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/phases/reorder",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = ReorderPhasesRequest,
    responses(
        (status = 204, description = "Phases reordered"),
        (status = 400, description = "ordered_ids does not match the project's phases")
    )
)]
pub async fn reorder_phases(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ReorderPhasesRequest>,
) -> Result<StatusCode, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let phases = phases_of(&state, id).await?;
    let existing: HashSet<i32> = phases.iter().map(|p| p.id).collect();
    let incoming: HashSet<i32> = payload.ordered_ids.iter().copied().collect();
    if existing != incoming || payload.ordered_ids.len() != phases.len() {
        return Err(ApiError::Validation(
            "ordered_ids must contain exactly this project's phase IDs".to_string(),
        ));
    }

    let order: std::collections::HashMap<i32, i32> = payload
        .ordered_ids
        .iter()
        .enumerate()
        .map(|(index, phase_id)| (*phase_id, index as i32 + 1))
        .collect();
    for phase in phases {
        if let Some(sort_order) = order.get(&phase.id).copied() {
            let mut phase: project_phases::ActiveModel = phase.into();
            phase.sort_order = Set(sort_order);
            phase.update(&state.db).await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/phases/{phase_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("phase_id" = i32, Path, description = "Phase ID")
    ),
    responses(
        (status = 204, description = "Phase deleted"),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn delete_phase(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, phase_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let phase = ProjectPhases::find_by_id(phase_id)
        .filter(project_phases::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phase not found".to_string()))?;

    ProjectPhases::delete_by_id(phase.id).exec(&state.db).await?;

    ProgressService::new(state.db.clone()).push_project(id).await;

    Ok(StatusCode::NO_CONTENT)
}
