use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{user, user_role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub authority: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    UserRole,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::UserRole => Entity::has_many(user_role::Entity).into(),
        }
    }
}

impl Related<user_role::Entity> for Entity {
    fn to() -> RelationDef { Relation::UserRole.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { user_role::Relation::User.def() }
    fn via() -> Option<RelationDef> { Some(user_role::Relation::Role.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}
