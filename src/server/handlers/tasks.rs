use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

use crate::database::entities::{
    phase_tasks, phase_tasks::Entity as PhaseTasks, project_phases,
    project_phases::Entity as ProjectPhases,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::policy::{require_project_manage, require_project_read};

const TASK_STATUSES: [&str; 4] = ["todo", "doing", "done", "canceled"];

fn parse_task_status(value: &str) -> Result<&'static str, ApiError> {
    TASK_STATUSES
        .iter()
        .find(|candidate| **candidate == value)
        .copied()
        .ok_or_else(|| ApiError::Validation(format!("Invalid task status: {value}")))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee_id: Option<i32>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub order: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub phase_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub order: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReorderTasksRequest {
    pub ordered_ids: Vec<i32>,
}

async fn find_phase_in_project(
    state: &AppState,
    project_id: i32,
    phase_id: i32,
) -> Result<project_phases::Model, ApiError> {
    ProjectPhases::find_by_id(phase_id)
        .filter(project_phases::Column::ProjectId.eq(project_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phase not found".to_string()))
}

async fn next_order(state: &AppState, phase_id: i32) -> Result<i32, ApiError> {
    let tasks = PhaseTasks::find()
        .filter(phase_tasks::Column::PhaseId.eq(phase_id))
        .all(&state.db)
        .await?;
    Ok(tasks.iter().map(|t| t.sort_order).max().unwrap_or(0) + 1)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/phases/{phase_id}/tasks",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("phase_id" = i32, Path, description = "Phase ID")
    ),
    responses(
        (status = 200, description = "Tasks in display order", body = [phase_tasks::Model]),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, phase_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<phase_tasks::Model>>, ApiError> {
    require_project_read(&state.db, id, &user).await?;
    find_phase_in_project(&state, id, phase_id).await?;

    let tasks = PhaseTasks::find()
        .filter(phase_tasks::Column::PhaseId.eq(phase_id))
        .order_by_asc(phase_tasks::Column::SortOrder)
        .order_by_asc(phase_tasks::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/phases/{phase_id}/tasks",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("phase_id" = i32, Path, description = "Phase ID")
    ),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = phase_tasks::Model),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, phase_id)): Path<(i32, i32)>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<phase_tasks::Model>), ApiError> {
    require_project_manage(&state.db, id, &user).await?;
    find_phase_in_project(&state, id, phase_id).await?;

    if payload.title.trim().is_empty() || payload.title.len() > 200 {
        return Err(ApiError::Validation(
            "Title must be between 1 and 200 characters".to_string(),
        ));
    }

    let status = match &payload.status {
        Some(value) => parse_task_status(value)?,
        None => "todo",
    };
    let sort_order = match payload.order {
        Some(order) => order,
        None => next_order(&state, phase_id).await?,
    };
    let now = Utc::now();

    let task = phase_tasks::ActiveModel {
        project_id: Set(id),
        phase_id: Set(phase_id),
        title: Set(payload.title),
        description: Set(payload.description),
        sort_order: Set(sort_order),
        status: Set(status.to_string()),
        assignee_id: Set(payload.assignee_id),
        start_date: Set(payload.start_date),
        due_date: Set(payload.due_date),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let task = task.insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}/tasks/{task_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("task_id" = i32, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = phase_tasks::Model),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, task_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<phase_tasks::Model>, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let task = PhaseTasks::find_by_id(task_id)
        .filter(phase_tasks::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let current_phase = task.phase_id;
    let mut task: phase_tasks::ActiveModel = task.into();

    // moving the task appends it to the target phase's tail
    if let Some(phase_id) = payload.phase_id {
        if phase_id != current_phase {
            match find_phase_in_project(&state, id, phase_id).await {
                Ok(_) => {}
                Err(ApiError::NotFound(_)) => {
                    return Err(ApiError::NotFound("Target phase not found".to_string()))
                }
                Err(other) => return Err(other),
            }
            task.phase_id = Set(phase_id);
            task.sort_order = Set(next_order(&state, phase_id).await?);
        }
    }

    if let Some(title) = payload.title {
        task.title = Set(title);
    }
    if let Some(description) = payload.description {
        task.description = Set(Some(description));
    }
    if let Some(order) = payload.order {
        task.sort_order = Set(order);
    }
    if let Some(status) = payload.status {
        let status = parse_task_status(&status)?;
        task.status = Set(status.to_string());
        task.completed_at = Set((status == "done").then(Utc::now));
    }
    if let Some(assignee_id) = payload.assignee_id {
        task.assignee_id = Set(Some(assignee_id));
    }
    if let Some(start_date) = payload.start_date {
        task.start_date = Set(Some(start_date));
    }
    if let Some(due_date) = payload.due_date {
        task.due_date = Set(Some(due_date));
    }
    task.updated_at = Set(Utc::now());

    let task = task.update(&state.db).await?;
    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/tasks/{task_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("task_id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, task_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let task = PhaseTasks::find_by_id(task_id)
        .filter(phase_tasks::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    PhaseTasks::delete_by_id(task.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/phases/{phase_id}/tasks/reorder",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("phase_id" = i32, Path, description = "Phase ID")
    ),
    request_body = ReorderTasksRequest,
    responses(
        (status = 204, description = "Tasks reordered"),
        (status = 400, description = "ordered_ids does not match the phase's tasks")
    )
)]
pub async fn reorder_tasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, phase_id)): Path<(i32, i32)>,
    Json(payload): Json<ReorderTasksRequest>,
) -> Result<StatusCode, ApiError> {
    require_project_manage(&state.db, id, &user).await?;

    let tasks = PhaseTasks::find()
        .filter(phase_tasks::Column::PhaseId.eq(phase_id))
        .filter(phase_tasks::Column::ProjectId.eq(id))
        .all(&state.db)
        .await?;

    let existing: HashSet<i32> = tasks.iter().map(|t| t.id).collect();
    let incoming: HashSet<i32> = payload.ordered_ids.iter().copied().collect();
    if existing != incoming || payload.ordered_ids.len() != tasks.len() {
        return Err(ApiError::Validation(
            "ordered_ids must match exactly the tasks of this phase".to_string(),
        ));
    }

    let order: HashMap<i32, i32> = payload
        .ordered_ids
        .iter()
        .enumerate()
        .map(|(index, task_id)| (*task_id, index as i32 + 1))
        .collect();
    for task in tasks {
        if let Some(sort_order) = order.get(&task.id).copied() {
            let mut task: phase_tasks::ActiveModel = task.into();
            task.sort_order = Set(sort_order);
            task.update(&state.db).await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
