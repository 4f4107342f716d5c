use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Simplified to String - canonical values are "Idea" | "Planning" |
// "Executing" | "Monitoring" | "Closed", parsed leniently at the API
// boundary the way clients actually send them.
pub type ProjectStatus = String;
pub type ProjectPriority = String;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Project)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    /// Derived (see `progress` module); recomputed and stored after every
    /// completion-affecting mutation, never authoritative on its own.
    pub progress: i32,
    pub owner_id: Option<i32>,
    pub department_id: Option<i32>,
    pub start_date: Option<ChronoDateTimeUtc>,
    pub end_date: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub total_budget: f64,
    pub spent_amount: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_phases::Entity")]
    ProjectPhases,
    #[sea_orm(has_many = "super::project_members::Entity")]
    ProjectMembers,
    #[sea_orm(has_many = "super::project_notes::Entity")]
    ProjectNotes,
    #[sea_orm(has_many = "super::project_files::Entity")]
    ProjectFiles,
    #[sea_orm(has_many = "super::project_expenses::Entity")]
    ProjectExpenses,
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Departments,
}

impl Related<super::project_phases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPhases.def()
    }
}

impl Related<super::project_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectMembers.def()
    }
}

impl Related<super::project_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectNotes.def()
    }
}

impl Related<super::project_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectFiles.def()
    }
}

impl Related<super::project_expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectExpenses.def()
    }
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
