//! UserRepository entity - the link between a user and a repository they can
//! see upstream.
//!
//! Links are never deleted. A repository that drops out of a user's listing
//! has its link disabled; reappearing flips it back.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_repositories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub repository_id: Uuid,
    #[sea_orm(default_value = false)]
    pub disabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::github_repository::Entity",
        from = "Column::RepositoryId",
        to = "super::github_repository::Column::Id",
        on_delete = "Cascade"
    )]
    GitHubRepository,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::github_repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GitHubRepository.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
