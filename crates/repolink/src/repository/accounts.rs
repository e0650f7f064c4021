use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::linked_account::{ActiveModel, Column, Entity as LinkedAccount, Model};

use super::errors::{RepositoryError, Result};
use super::users::find_user;

/// Upstream identity to attach to a user.
#[derive(Debug, Clone, Default)]
pub struct AccountLink {
    pub provider_login: String,
    pub access_token: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn find_account_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<Model>> {
    Ok(LinkedAccount::find()
        .filter(Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Attach an upstream account to a user, replacing any existing link.
///
/// # Errors
/// Returns `NotFound` if the user does not exist and `InvalidInput` for a
/// blank provider login.
pub async fn link_account<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    link: AccountLink,
) -> Result<Model> {
    let provider_login = link.provider_login.trim().to_string();
    if provider_login.is_empty() {
        return Err(RepositoryError::InvalidInput {
            message: "provider login must not be empty".to_string(),
        });
    }
    if find_user(conn, user_id).await?.is_none() {
        return Err(RepositoryError::user_not_found(user_id));
    }

    let model = match find_account_for_user(conn, user_id).await? {
        Some(existing) => {
            let mut active: ActiveModel = existing.into();
            active.provider_login = Set(provider_login);
            active.access_token = Set(link.access_token);
            active.avatar_url = Set(link.avatar_url);
            active.update(conn).await?
        }
        None => {
            ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                provider_login: Set(provider_login),
                access_token: Set(link.access_token),
                avatar_url: Set(link.avatar_url),
                created_at: Set(Utc::now().fixed_offset()),
            }
            .insert(conn)
            .await?
        }
    };

    tracing::debug!(%user_id, login = %model.provider_login, "linked upstream account");
    Ok(model)
}
