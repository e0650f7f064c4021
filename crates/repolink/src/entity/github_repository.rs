//! GitHubRepository entity - one row per upstream repository, shared by every
//! user that can see it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "github_repositories")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Upstream numeric id. Globally unique and never changed after insert.
    #[sea_orm(unique)]
    pub github_id: i64,

    // ─── Naming ──────────────────────────────────────────────────────────────
    pub name: String,
    /// `owner/name` as reported upstream.
    pub full_name: String,
    #[sea_orm(column_type = "Text")]
    pub html_url: String,

    // ─── Content ─────────────────────────────────────────────────────────────
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub language: Option<String>,
    #[sea_orm(default_value = false)]
    pub private: bool,

    // ─── Statistics ──────────────────────────────────────────────────────────
    pub stargazers_count: i32,
    pub forks_count: i32,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// When a reconciliation pass last wrote this row.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_repository::Entity")]
    UserRepositories,
}

impl Related<super::user_repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRepositories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Owner segment of `full_name`, if present.
    pub fn owner(&self) -> Option<&str> {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .filter(|owner| !owner.is_empty())
    }
}
