use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::github_repository::{Column, Entity as GitHubRepository, Model};
use crate::entity::user_repository::{self, Entity as UserRepository};

use super::errors::Result;

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (0-indexed).
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
}

const MIN_PER_PAGE: u64 = 1;

impl Pagination {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: per_page.max(MIN_PER_PAGE),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: MIN_PER_PAGE,
        }
    }
}

/// Result of a paginated query.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    /// The items for the current page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (0-indexed).
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

/// A repository as seen by one user, carrying that user's link state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedRepository {
    pub github_id: i64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub private: bool,
    pub stargazers_count: i32,
    pub forks_count: i32,
    pub disabled: bool,
}

impl LinkedRepository {
    fn from_parts(repo: Model, link: user_repository::Model) -> Self {
        Self {
            github_id: repo.github_id,
            name: repo.name,
            full_name: repo.full_name,
            html_url: repo.html_url,
            description: repo.description,
            language: repo.language,
            private: repo.private,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            disabled: link.disabled,
        }
    }
}

/// One page of a user's linked repositories, most starred first, ties broken
/// by full name.
pub async fn find_linked_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    pagination: Pagination,
) -> Result<PaginatedResult<LinkedRepository>> {
    let paginator = GitHubRepository::find()
        .inner_join(UserRepository)
        .filter(user_repository::Column::UserId.eq(user_id))
        .select_also(UserRepository)
        .order_by_desc(Column::StargazersCount)
        .order_by_asc(Column::FullName)
        .paginate(conn, pagination.per_page.max(MIN_PER_PAGE));

    let total = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    // Past the last page there is nothing to fetch, and the offset
    // `page * per_page` may not fit in a u64.
    let items = if pagination.page < total_pages {
        paginator
            .fetch_page(pagination.page)
            .await?
            .into_iter()
            // Inner join: every row carries its link.
            .filter_map(|(repo, link)| link.map(|link| LinkedRepository::from_parts(repo, link)))
            .collect()
    } else {
        Vec::new()
    };

    Ok(PaginatedResult {
        items,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
        total_pages,
    })
}

/// Count a user's links, optionally restricted to enabled ones.
pub async fn count_links_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    enabled_only: bool,
) -> Result<u64> {
    let mut query = UserRepository::find().filter(user_repository::Column::UserId.eq(user_id));
    if enabled_only {
        query = query.filter(user_repository::Column::Disabled.eq(false));
    }
    Ok(query.count(conn).await?)
}
