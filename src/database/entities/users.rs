use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Simplified to String - validated at the API boundary ("admin" | "pm" | "member")
pub type UserRole = String;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub department_id: Option<i32>,
    pub created_at: ChronoDateTimeUtc,
}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_members::Entity")]
    ProjectMembers,
    #[sea_orm(has_many = "super::project_notes::Entity")]
    ProjectNotes,
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

impl ActiveModelBehavior for ActiveModel {}
