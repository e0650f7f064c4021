//! Repolink - reconcile a user's GitHub repositories into a local store.
//!
//! A reconciliation pass fetches every repository visible to a user's linked
//! GitHub account and merges the listing into the store: new repositories are
//! created and linked, changed ones updated, and links to repositories that
//! disappeared upstream are disabled rather than deleted. Each pass commits in
//! a single transaction.
//!
//! # Features
//!
//! - `sqlite` / `postgres` - Database backends.
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use repolink::{connect_and_migrate, credentials::DbCredentialSource};
//! use repolink::github::{GitHubClient, GitHubClientConfig};
//! use repolink::sync::SyncService;
//!
//! let db = Arc::new(connect_and_migrate("sqlite://repolink.db?mode=rwc").await?);
//! let service = SyncService::new(
//!     Arc::clone(&db),
//!     Arc::new(DbCredentialSource::new(Arc::clone(&db))),
//!     Arc::new(GitHubClient::new(GitHubClientConfig::default())?),
//! );
//! let report = service.run_pass(user_id).await?;
//! println!("{} repositories, {} writes", report.fetched, report.applied_count);
//! ```

pub mod browse;
pub mod credentials;
pub mod db;
pub mod entity;
pub mod github;
pub mod http;
pub mod repository;
pub mod retry;
pub mod server;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use repository::RepositoryError;
