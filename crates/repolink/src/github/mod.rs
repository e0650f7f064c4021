//! GitHub repository listing.
//!
//! - [`error`] - Error taxonomy for upstream reads
//! - [`types`] - Wire payloads and normalized repositories
//! - [`client`] - Paginated, retrying client over [`crate::http::HttpTransport`]
//! - [`convert`] - Payload normalization and entity conversion

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_TIMEOUT, GitHubClient, GitHubClientConfig, RepositorySource};
pub use error::{GitHubError, short_error_message};
pub use types::{
    DEFAULT_API_URL, DEFAULT_PAGE_SIZE, MAX_PAGES, RemoteListing, RemoteRepo, RepoPayload,
};
