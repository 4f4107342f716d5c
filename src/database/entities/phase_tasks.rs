use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Simplified to String - "todo" | "doing" | "done" | "canceled"
pub type TaskStatus = String;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PhaseTask)]
#[sea_orm(table_name = "phase_tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub phase_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub sort_order: i32,
    pub status: TaskStatus,
    pub assignee_id: Option<i32>,
    pub start_date: Option<ChronoDateTimeUtc>,
    pub due_date: Option<ChronoDateTimeUtc>,
    pub completed_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::project_phases::Entity",
        from = "Column::PhaseId",
        to = "super::project_phases::Column::Id"
    )]
    ProjectPhases,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::project_phases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPhases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
