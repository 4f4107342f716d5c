use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PhaseDetailNote)]
#[sea_orm(table_name = "phase_detail_notes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub detail_id: i32,
    pub user: String,
    #[sea_orm(column_type = "Text")]
    pub note: String,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::phase_details::Entity",
        from = "Column::DetailId",
        to = "super::phase_details::Column::Id"
    )]
    PhaseDetails,
}

impl Related<super::phase_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhaseDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
