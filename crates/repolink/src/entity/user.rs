//! User entity - the local account that repositories are linked to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login name, unique across the store.
    #[sea_orm(unique)]
    pub username: String,

    pub created_at: DateTimeWithTimeZone,

    /// When the last successful reconciliation pass for this user committed.
    pub last_synced_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::linked_account::Entity")]
    LinkedAccount,
    #[sea_orm(has_many = "super::user_repository::Entity")]
    UserRepositories,
}

impl Related<super::linked_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedAccount.def()
    }
}

impl Related<super::user_repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRepositories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
