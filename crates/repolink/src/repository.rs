//! Local store operations over the repolink schema.
//!
//! Every function is generic over [`sea_orm::ConnectionTrait`] so the
//! reconciler can run the write path inside a single transaction.

mod accounts;
mod errors;
mod links;
mod query;
mod repos;
mod users;

pub use accounts::{AccountLink, find_account_for_user, link_account};
pub use errors::{RepositoryError, Result};
pub use links::{find_links_for_user, insert_links, set_links_disabled};
pub use query::{
    LinkedRepository, PaginatedResult, Pagination, count_links_for_user, find_linked_for_user,
};
pub use repos::{
    LOOKUP_CHUNK_SIZE, count, find_by_github_id, find_by_github_ids, find_by_ids,
    insert_repositories, search, update_repositories,
};
pub use users::{create_user, find_user, find_user_by_username, list_users, mark_synced};
