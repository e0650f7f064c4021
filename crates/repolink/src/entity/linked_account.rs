//! LinkedAccount entity - the upstream identity attached to a user.
//!
//! A row without an `access_token` means the account is linked but holds no
//! usable credential; reconciliation passes for that user fail with `no_token`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "linked_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user. At most one linked account per user.
    #[sea_orm(unique)]
    pub user_id: Uuid,

    /// Login on the upstream provider.
    pub provider_login: String,

    /// OAuth access token used for upstream reads.
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The access token, if present and not blank.
    pub fn usable_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_account(token: Option<&str>) -> Model {
        Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider_login: "octocat".to_string(),
            access_token: token.map(str::to_string),
            avatar_url: None,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn usable_token_ignores_blank_values() {
        assert_eq!(make_account(Some("ghp_abc")).usable_token(), Some("ghp_abc"));
        assert_eq!(make_account(Some("   ")).usable_token(), None);
        assert_eq!(make_account(None).usable_token(), None);
    }

    #[test]
    fn access_token_is_not_serialized() {
        let json = serde_json::to_value(make_account(Some("secret"))).expect("serialize");
        assert!(json.get("access_token").is_none());
        assert_eq!(json["provider_login"], "octocat");
    }
}
