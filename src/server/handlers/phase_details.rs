//! CRUD for the per-phase detail tree.
//!
//! Each mutation is mirrored onto the in-memory forest with the pure ops
//! from `tree`, and the mirrored forest feeds the progress roll-up, so the
//! stored project progress always reflects the post-mutation state.

use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use utoipa::ToSchema;

use crate::database::entities::{
    phase_detail_notes, phase_detail_notes::Entity as PhaseDetailNotes, phase_details,
    phase_details::Entity as PhaseDetails, project_phases,
    project_phases::Entity as ProjectPhases,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::services::ProgressService;
use crate::tree::{self, ItemType, MutationPolicy, NodeChanges, TreeNode};

#[derive(Deserialize, ToSchema)]
pub struct CreateDetailRequest {
    pub phase_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub sort_order: Option<i32>,
    pub parent_id: Option<i32>,
    pub item_type: Option<String>,
    pub scope: Option<String>,
    pub reference: Option<String>,
    pub responsible: Option<String>,
    pub effort: Option<f64>,
    pub unit: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDetailRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub sort_order: Option<i32>,
    pub parent_id: Option<i32>,
    pub item_type: Option<String>,
    pub scope: Option<String>,
    pub reference: Option<String>,
    pub responsible: Option<String>,
    pub effort: Option<f64>,
    pub unit: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDetailNoteRequest {
    pub user: String,
    pub note: String,
}

fn validate_detail_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() || title.len() > 200 {
        return Err(ApiError::Validation(
            "Title must be between 1 and 200 characters".to_string(),
        ));
    }
    Ok(())
}

async fn find_phase(state: &AppState, phase_id: i32) -> Result<project_phases::Model, ApiError> {
    ProjectPhases::find_by_id(phase_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phase not found".to_string()))
}

async fn find_detail(state: &AppState, detail_id: i32) -> Result<phase_details::Model, ApiError> {
    PhaseDetails::find_by_id(detail_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Detail not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/phase-details/phase/{phase_id}",
    params(("phase_id" = i32, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Flat detail rows in display order", body = [phase_details::Model]),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn list_phase_details(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(phase_id): Path<i32>,
) -> Result<Json<Vec<phase_details::Model>>, ApiError> {
    find_phase(&state, phase_id).await?;

    let details = PhaseDetails::find()
        .filter(phase_details::Column::PhaseId.eq(phase_id))
        .order_by_asc(phase_details::Column::SortOrder)
        .order_by_asc(phase_details::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/api/v1/phase-details/phase/{phase_id}/tree",
    params(("phase_id" = i32, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Detail rows resolved into a forest", body = [TreeNode]),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn get_phase_tree(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(phase_id): Path<i32>,
) -> Result<Json<Vec<TreeNode>>, ApiError> {
    find_phase(&state, phase_id).await?;

    let forest = ProgressService::new(state.db.clone())
        .phase_forest(phase_id)
        .await?;
    Ok(Json(forest))
}

#[utoipa::path(
    post,
    path = "/api/v1/phase-details",
    request_body = CreateDetailRequest,
    responses(
        (status = 200, description = "Detail created with its assigned id", body = phase_details::Model),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn create_phase_detail(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(payload): Json<CreateDetailRequest>,
) -> Result<Json<phase_details::Model>, ApiError> {
    validate_detail_title(&payload.title)?;
    let phase = find_phase(&state, payload.phase_id).await?;

    let progress = ProgressService::new(state.db.clone());
    let forest = progress.phase_forest(phase.id).await?;

    let item_type = payload
        .item_type
        .as_deref()
        .map(ItemType::parse)
        .unwrap_or_default();
    let now = Utc::now();

    let detail = phase_details::ActiveModel {
        phase_id: Set(phase.id),
        parent_id: Set(payload.parent_id),
        title: Set(payload.title),
        description: Set(payload.description),
        is_completed: Set(payload.is_completed),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        item_type: Set(item_type.as_str().to_string()),
        scope: Set(payload.scope),
        reference: Set(payload.reference),
        responsible: Set(payload.responsible),
        effort: Set(payload.effort),
        unit: Set(payload.unit.unwrap_or_else(|| "Hours".to_string())),
        priority: Set(payload.priority.unwrap_or_else(|| "Normal".to_string())),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        completed_at: Set(payload.is_completed.then(|| now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let detail = detail.insert(&state.db).await?;

    // mirror the insert onto the pre-insert forest
    let node = TreeNode::leaf(detail.id, detail.title.clone(), detail.is_completed, item_type);
    let forest = match detail.parent_id {
        Some(parent) => match tree::add_child(&forest, parent, node.clone(), MutationPolicy::Strict)
        {
            Ok(forest) => forest,
            Err(_) => {
                debug!(detail = detail.id, parent, "parent not in phase, new detail becomes a root");
                let mut forest = forest;
                forest.push(node);
                forest
            }
        },
        None => {
            let mut forest = forest;
            forest.push(node);
            forest
        }
    };

    progress
        .push_project_with(phase.project_id, phase.id, &forest)
        .await;

    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/phase-details/{detail_id}",
    params(("detail_id" = i32, Path, description = "Detail ID")),
    request_body = UpdateDetailRequest,
    responses(
        (status = 200, description = "Detail updated", body = phase_details::Model),
        (status = 404, description = "Detail not found")
    )
)]
pub async fn update_phase_detail(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(detail_id): Path<i32>,
    Json(payload): Json<UpdateDetailRequest>,
) -> Result<Json<phase_details::Model>, ApiError> {
    let existing = find_detail(&state, detail_id).await?;
    let phase = find_phase(&state, existing.phase_id).await?;

    let progress = ProgressService::new(state.db.clone());
    let forest = progress.phase_forest(phase.id).await?;

    let reparented = matches!(payload.parent_id, Some(parent) if Some(parent) != existing.parent_id);

    // completion transitions stamp/clear completed_at
    let completed_at = match payload.is_completed {
        Some(true) => existing.completed_at.or_else(|| Some(Utc::now())),
        Some(false) => None,
        None => existing.completed_at,
    };

    let changes = NodeChanges {
        title: payload.title.clone(),
        completed: payload.is_completed,
        item_type: payload.item_type.as_deref().map(ItemType::parse),
    };

    let mut detail: phase_details::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        validate_detail_title(&title)?;
        detail.title = Set(title);
    }
    if let Some(description) = payload.description {
        detail.description = Set(Some(description));
    }
    if let Some(is_completed) = payload.is_completed {
        detail.is_completed = Set(is_completed);
    }
    detail.completed_at = Set(completed_at);
    if let Some(sort_order) = payload.sort_order {
        detail.sort_order = Set(sort_order);
    }
    if let Some(parent_id) = payload.parent_id {
        detail.parent_id = Set(Some(parent_id));
    }
    if let Some(item_type) = &payload.item_type {
        detail.item_type = Set(ItemType::parse(item_type).as_str().to_string());
    }
    if let Some(scope) = payload.scope {
        detail.scope = Set(Some(scope));
    }
    if let Some(reference) = payload.reference {
        detail.reference = Set(Some(reference));
    }
    if let Some(responsible) = payload.responsible {
        detail.responsible = Set(Some(responsible));
    }
    if let Some(effort) = payload.effort {
        detail.effort = Set(Some(effort));
    }
    if let Some(unit) = payload.unit {
        detail.unit = Set(unit);
    }
    if let Some(priority) = payload.priority {
        detail.priority = Set(priority);
    }
    if let Some(start_date) = payload.start_date {
        detail.start_date = Set(Some(start_date));
    }
    if let Some(end_date) = payload.end_date {
        detail.end_date = Set(Some(end_date));
    }
    detail.updated_at = Set(Utc::now());

    let detail = detail.update(&state.db).await?;

    if reparented {
        // shape changed; rebuild from storage rather than mirroring
        progress.push_project(phase.project_id).await;
    } else {
        match tree::update_node(&forest, detail.id, &changes, MutationPolicy::Strict) {
            Ok(forest) => {
                progress
                    .push_project_with(phase.project_id, phase.id, &forest)
                    .await;
            }
            Err(_) => progress.push_project(phase.project_id).await,
        }
    }

    Ok(Json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/phase-details/{detail_id}",
    params(("detail_id" = i32, Path, description = "Detail ID")),
    responses(
        (status = 200, description = "Detail and its subtree deleted"),
        (status = 404, description = "Detail not found")
    )
)]
pub async fn delete_phase_detail(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(detail_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let existing = find_detail(&state, detail_id).await?;
    let phase = find_phase(&state, existing.phase_id).await?;

    let progress = ProgressService::new(state.db.clone());
    let forest = progress.phase_forest(phase.id).await?;

    // deleting a container takes its whole subtree with it
    let mut doomed = tree::subtree_ids(&forest, detail_id);
    if doomed.is_empty() {
        doomed.push(detail_id);
    }

    PhaseDetails::delete_many()
        .filter(phase_details::Column::Id.is_in(doomed))
        .exec(&state.db)
        .await?;

    match tree::delete_node(&forest, detail_id, MutationPolicy::Strict) {
        Ok(forest) => {
            progress
                .push_project_with(phase.project_id, phase.id, &forest)
                .await;
        }
        Err(_) => progress.push_project(phase.project_id).await,
    }

    Ok(Json(json!({ "message": "Detail deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/phase-details/{detail_id}/notes",
    params(("detail_id" = i32, Path, description = "Detail ID")),
    responses(
        (status = 200, description = "Notes, newest first", body = [phase_detail_notes::Model]),
        (status = 404, description = "Detail not found")
    )
)]
pub async fn list_detail_notes(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(detail_id): Path<i32>,
) -> Result<Json<Vec<phase_detail_notes::Model>>, ApiError> {
    find_detail(&state, detail_id).await?;

    let notes = PhaseDetailNotes::find()
        .filter(phase_detail_notes::Column::DetailId.eq(detail_id))
        .order_by_desc(phase_detail_notes::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(notes))
}

#[utoipa::path(
    post,
    path = "/api/v1/phase-details/{detail_id}/notes",
    params(("detail_id" = i32, Path, description = "Detail ID")),
    request_body = CreateDetailNoteRequest,
    responses(
        (status = 200, description = "Note created", body = phase_detail_notes::Model),
        (status = 404, description = "Detail not found")
    )
)]
pub async fn create_detail_note(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(detail_id): Path<i32>,
    Json(payload): Json<CreateDetailNoteRequest>,
) -> Result<Json<phase_detail_notes::Model>, ApiError> {
    find_detail(&state, detail_id).await?;

    let note = phase_detail_notes::ActiveModel {
        detail_id: Set(detail_id),
        user: Set(payload.user),
        note: Set(payload.note),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let note = note.insert(&state.db).await?;
    Ok(Json(note))
}
