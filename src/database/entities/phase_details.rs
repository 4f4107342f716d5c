use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tree::{FlatRecord, ItemType};

/// One row of a phase's detail tree. `parent_id` points at another row of
/// the same phase; `item_type` is "task" or "sub_phase".
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PhaseDetail)]
#[sea_orm(table_name = "phase_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub phase_id: i32,
    pub parent_id: Option<i32>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_completed: bool,
    pub sort_order: i32,
    pub item_type: String,
    pub scope: Option<String>,
    pub reference: Option<String>,
    pub responsible: Option<String>,
    pub effort: Option<f64>,
    pub unit: String,
    pub priority: String,
    pub start_date: Option<ChronoDateTimeUtc>,
    pub end_date: Option<ChronoDateTimeUtc>,
    pub completed_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

impl Model {
    pub fn as_flat_record(&self) -> FlatRecord {
        FlatRecord {
            id: self.id,
            parent_id: self.parent_id,
            title: self.title.clone(),
            completed: self.is_completed,
            item_type: ItemType::parse(&self.item_type),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project_phases::Entity",
        from = "Column::PhaseId",
        to = "super::project_phases::Column::Id"
    )]
    ProjectPhases,
    #[sea_orm(has_many = "super::phase_detail_notes::Entity")]
    PhaseDetailNotes,
}

impl Related<super::project_phases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPhases.def()
    }
}

impl Related<super::phase_detail_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhaseDetailNotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
