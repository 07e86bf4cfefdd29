use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Campus-issued student number, absent for staff accounts.
    #[sea_orm(column_type = "String(StringLen::N(10))", unique, nullable)]
    pub student_id: Option<String>,

    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub first_name: String,

    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub last_name: String,

    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub email: String,

    /// Stored credential. Length is validated to 8..=64 at write time.
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::refresh_tokens::Entity")]
    RefreshTokens,
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
}

impl Related<super::refresh_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshTokens.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
