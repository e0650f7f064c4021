use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::entity::user_repository::{ActiveModel, Column, Entity as UserRepository, Model};

use super::errors::Result;
use super::repos::LOOKUP_CHUNK_SIZE;

/// Every link of a user, enabled or not.
pub async fn find_links_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<Model>> {
    Ok(UserRepository::find()
        .filter(Column::UserId.eq(user_id))
        .all(conn)
        .await?)
}

pub async fn insert_links<C: ConnectionTrait>(conn: &C, models: Vec<ActiveModel>) -> Result<u64> {
    let mut inserted = 0u64;
    let mut models = models.into_iter().peekable();
    while models.peek().is_some() {
        let chunk: Vec<ActiveModel> = models.by_ref().take(LOOKUP_CHUNK_SIZE).collect();
        inserted += chunk.len() as u64;
        UserRepository::insert_many(chunk).exec(conn).await?;
    }
    Ok(inserted)
}

/// Flip the `disabled` flag on the given links. Returns the number of rows
/// changed; links already in the requested state are not touched.
pub async fn set_links_disabled<C: ConnectionTrait>(
    conn: &C,
    link_ids: &[Uuid],
    disabled: bool,
    now: DateTime<FixedOffset>,
) -> Result<u64> {
    let mut changed = 0u64;
    for chunk in link_ids.chunks(LOOKUP_CHUNK_SIZE) {
        let result = UserRepository::update_many()
            .col_expr(Column::Disabled, Expr::value(disabled))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.is_in(chunk.iter().copied()))
            .filter(Column::Disabled.ne(disabled))
            .exec(conn)
            .await?;
        changed += result.rows_affected;
    }
    Ok(changed)
}
