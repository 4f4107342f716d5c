use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::entities::{
    project_expenses, project_expenses::Entity as ProjectExpenses, projects,
};
use crate::server::app::AppState;
use crate::server::auth::AuthUser;
use crate::server::error::ApiError;
use crate::server::policy::{require_project_manage, require_project_read};

#[derive(Deserialize, ToSchema)]
pub struct SetBudgetRequest {
    pub total_budget: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BudgetSummaryOut {
    pub project_id: i32,
    pub total_budget: f64,
    pub spent_amount: f64,
    pub remaining: f64,
    pub percent_used: f64,
}

fn summary(project: &projects::Model) -> BudgetSummaryOut {
    let percent = if project.total_budget > 0.0 {
        project.spent_amount / project.total_budget * 100.0
    } else {
        0.0
    };
    BudgetSummaryOut {
        project_id: project.id,
        total_budget: project.total_budget,
        spent_amount: project.spent_amount,
        remaining: project.total_budget - project.spent_amount,
        percent_used: (percent * 100.0).round() / 100.0,
    }
}

/// Re-derives the stored spent total from the expense rows.
async fn sync_spent(state: &AppState, project: projects::Model) -> Result<projects::Model, ApiError> {
    let expenses = ProjectExpenses::find()
        .filter(project_expenses::Column::ProjectId.eq(project.id))
        .all(&state.db)
        .await?;
    let spent: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut project: projects::ActiveModel = project.into();
    project.spent_amount = Set(spent);
    Ok(project.update(&state.db).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/budget",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Budget summary", body = BudgetSummaryOut)
    )
)]
pub async fn get_budget(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<BudgetSummaryOut>, ApiError> {
    let project = require_project_read(&state.db, id, &user).await?;
    Ok(Json(summary(&project)))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/budget",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = SetBudgetRequest,
    responses(
        (status = 200, description = "Budget set", body = BudgetSummaryOut),
        (status = 400, description = "Budget must be >= 0")
    )
)]
pub async fn set_budget(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SetBudgetRequest>,
) -> Result<Json<BudgetSummaryOut>, ApiError> {
    let project = require_project_manage(&state.db, id, &user).await?;
    if payload.total_budget < 0.0 {
        return Err(ApiError::Validation("Budget must be >= 0".to_string()));
    }

    // spent_amount is owned by the expense rows, never set directly
    let mut project: projects::ActiveModel = project.into();
    project.total_budget = Set(payload.total_budget);
    let project = project.update(&state.db).await?;

    Ok(Json(summary(&project)))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/expenses",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = project_expenses::Model),
        (status = 400, description = "Amount must be > 0")
    )
)]
pub async fn add_expense(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<project_expenses::Model>), ApiError> {
    let project = require_project_manage(&state.db, id, &user).await?;
    if payload.amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be > 0".to_string()));
    }
    if payload.note.as_deref().map(|n| n.len() > 255).unwrap_or(false) {
        return Err(ApiError::Validation(
            "Note must be at most 255 characters".to_string(),
        ));
    }

    let expense = project_expenses::ActiveModel {
        project_id: Set(id),
        amount: Set(payload.amount),
        note: Set(payload.note),
        created_by: Set(Some(user.id)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let expense = expense.insert(&state.db).await?;

    sync_spent(&state, project).await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/expenses",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Expenses, newest first", body = [project_expenses::Model])
    )
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<project_expenses::Model>>, ApiError> {
    require_project_read(&state.db, id, &user).await?;

    let expenses = ProjectExpenses::find()
        .filter(project_expenses::Column::ProjectId.eq(id))
        .order_by_desc(project_expenses::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/expenses/{expense_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("expense_id" = i32, Path, description = "Expense ID")
    ),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 404, description = "Expense not found")
    )
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, expense_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let project = require_project_manage(&state.db, id, &user).await?;

    let expense = ProjectExpenses::find_by_id(expense_id)
        .filter(project_expenses::Column::ProjectId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    ProjectExpenses::delete_by_id(expense.id)
        .exec(&state.db)
        .await?;

    sync_spent(&state, project).await?;

    Ok(StatusCode::NO_CONTENT)
}
