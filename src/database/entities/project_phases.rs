use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Stored as String; parsed into `progress::PhaseStatus` where the roll-up
// policy needs it.
pub type PhaseStatusColumn = String;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ProjectPhase)]
#[sea_orm(table_name = "project_phases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub sort_order: i32,
    pub status: PhaseStatusColumn,
    pub start_date: Option<ChronoDateTimeUtc>,
    pub end_date: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(has_many = "super::phase_details::Entity")]
    PhaseDetails,
    #[sea_orm(has_many = "super::phase_tasks::Entity")]
    PhaseTasks,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::phase_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhaseDetails.def()
    }
}

impl Related<super::phase_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhaseTasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
