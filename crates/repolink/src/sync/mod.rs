//! Repository reconciliation.
//!
//! # Module Structure
//!
//! - [`reconcile`] - Diff a fetched listing against the store and apply it in
//!   one transaction
//! - [`SyncService`] - Credential lookup, fetch and reconcile for one user
//! - [`SyncScheduler`] - Rate-limited background triggers with a per-user
//!   in-flight marker
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use repolink::credentials::DbCredentialSource;
//! use repolink::github::{GitHubClient, GitHubClientConfig};
//! use repolink::sync::{DEFAULT_SYNC_WINDOW, SyncScheduler, SyncService};
//!
//! let service = SyncService::new(
//!     Arc::clone(&db),
//!     Arc::new(DbCredentialSource::new(Arc::clone(&db))),
//!     Arc::new(GitHubClient::new(GitHubClientConfig::default())?),
//! );
//! let scheduler = SyncScheduler::new(service, DEFAULT_SYNC_WINDOW);
//! let ticket = scheduler.trigger(user_id)?;
//! ```

mod error;
mod rate_limit;
pub mod reconcile;
mod scheduler;
mod service;
mod types;

pub use error::{Result, SyncError};
pub use rate_limit::TriggerRateLimiter;
pub use reconcile::{ReconcilePlan, reconcile};
pub use scheduler::{SyncScheduler, SyncTicket, TriggerRejection};
pub use service::SyncService;
pub use types::{DEFAULT_SYNC_WINDOW, ReconcileReport};
