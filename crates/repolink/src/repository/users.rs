use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::user::{ActiveModel, Column, Entity as User, Model};

use super::errors::{RepositoryError, Result};

/// Create a user with a unique username.
pub async fn create_user<C: ConnectionTrait>(conn: &C, username: &str) -> Result<Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(RepositoryError::InvalidInput {
            message: "username must not be empty".to_string(),
        });
    }

    if find_user_by_username(conn, username).await?.is_some() {
        return Err(RepositoryError::Duplicate {
            context: format!("user {username}"),
        });
    }

    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        last_synced_at: Set(None),
    };
    Ok(model.insert(conn).await?)
}

pub async fn find_user<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>> {
    Ok(User::find_by_id(id).one(conn).await?)
}

pub async fn find_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<Model>> {
    Ok(User::find()
        .filter(Column::Username.eq(username))
        .one(conn)
        .await?)
}

/// All users, ordered by username.
pub async fn list_users<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>> {
    Ok(User::find()
        .order_by_asc(Column::Username)
        .all(conn)
        .await?)
}

/// Record the commit time of a reconciliation pass.
pub async fn mark_synced<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    at: chrono::DateTime<chrono::FixedOffset>,
) -> Result<()> {
    let result = User::update_many()
        .col_expr(Column::LastSyncedAt, sea_orm::sea_query::Expr::value(at))
        .filter(Column::Id.eq(user_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(RepositoryError::user_not_found(user_id));
    }
    Ok(())
}
