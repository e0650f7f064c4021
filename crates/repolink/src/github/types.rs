//! Wire and normalized repository types.

use serde::{Deserialize, Serialize};

/// Default number of repositories requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Hard stop for pagination against a misbehaving upstream.
pub const MAX_PAGES: u32 = 1_000;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// A repository as returned by `GET /user/repos`. Everything except the id
/// may be null or absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoPayload {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: Option<i64>,
    #[serde(default)]
    pub forks_count: Option<i64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub private: Option<bool>,
}

/// A remote repository after null normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepo {
    pub github_id: i64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: i32,
    pub forks_count: i32,
    pub language: Option<String>,
    pub private: bool,
}

/// The outcome of a full listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteListing {
    pub repos: Vec<RemoteRepo>,
    /// Pagination stopped early on a non-success status. The repos collected
    /// so far are valid, but absence from the list proves nothing.
    pub truncated: bool,
}

impl RemoteListing {
    pub fn complete(repos: Vec<RemoteRepo>) -> Self {
        Self {
            repos,
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}
