//! SeaORM entity definitions for the repolink database schema.

pub mod github_repository;
pub mod linked_account;
pub mod prelude;
pub mod user;
pub mod user_repository;
