use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entity::github_repository::{ActiveModel, Column, Entity as GitHubRepository, Model};

use super::errors::Result;

/// Maximum number of ids bound into one `IN (...)` clause.
pub const LOOKUP_CHUNK_SIZE: usize = 500;

/// Load every repository whose upstream id is in `github_ids`.
pub async fn find_by_github_ids<C: ConnectionTrait>(
    conn: &C,
    github_ids: &[i64],
) -> Result<Vec<Model>> {
    let mut found = Vec::with_capacity(github_ids.len());
    for chunk in github_ids.chunks(LOOKUP_CHUNK_SIZE) {
        let rows = GitHubRepository::find()
            .filter(Column::GithubId.is_in(chunk.iter().copied()))
            .all(conn)
            .await?;
        found.extend(rows);
    }
    Ok(found)
}

pub async fn find_by_github_id<C: ConnectionTrait>(
    conn: &C,
    github_id: i64,
) -> Result<Option<Model>> {
    Ok(GitHubRepository::find()
        .filter(Column::GithubId.eq(github_id))
        .one(conn)
        .await?)
}

/// Insert new repository rows in chunks. Returns the number of rows inserted.
pub async fn insert_repositories<C: ConnectionTrait>(
    conn: &C,
    models: Vec<ActiveModel>,
) -> Result<u64> {
    let mut inserted = 0u64;
    let mut models = models.into_iter().peekable();
    while models.peek().is_some() {
        let chunk: Vec<ActiveModel> = models.by_ref().take(LOOKUP_CHUNK_SIZE).collect();
        inserted += chunk.len() as u64;
        GitHubRepository::insert_many(chunk).exec(conn).await?;
    }
    Ok(inserted)
}

/// Write changed columns of existing repository rows.
pub async fn update_repositories<C: ConnectionTrait>(
    conn: &C,
    models: Vec<ActiveModel>,
) -> Result<u64> {
    let mut updated = 0u64;
    for model in models {
        GitHubRepository::update(model).exec(conn).await?;
        updated += 1;
    }
    Ok(updated)
}

/// Search repositories by name, full name, language or upstream id, most
/// starred first.
pub async fn search<C: ConnectionTrait>(conn: &C, term: &str, limit: u64) -> Result<Vec<Model>> {
    let term = term.trim();
    let mut condition = Condition::any()
        .add(Column::Name.contains(term))
        .add(Column::FullName.contains(term))
        .add(Column::Language.contains(term));
    if let Ok(github_id) = term.parse::<i64>() {
        condition = condition.add(Column::GithubId.eq(github_id));
    }

    Ok(GitHubRepository::find()
        .filter(condition)
        .order_by_desc(Column::StargazersCount)
        .order_by_asc(Column::FullName)
        .limit(limit)
        .all(conn)
        .await?)
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64> {
    Ok(GitHubRepository::find().count(conn).await?)
}

/// Load repositories by internal id.
pub async fn find_by_ids<C: ConnectionTrait>(conn: &C, ids: &[uuid::Uuid]) -> Result<Vec<Model>> {
    let mut found = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(LOOKUP_CHUNK_SIZE) {
        let rows = GitHubRepository::find()
            .filter(Column::Id.is_in(chunk.iter().copied()))
            .all(conn)
            .await?;
        found.extend(rows);
    }
    Ok(found)
}
