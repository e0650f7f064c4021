//! Paginated repository listing over an [`HttpTransport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::retry::{RetryConfig, with_retry};

use super::error::{GitHubError, short_error_message};
use super::types::{
    DEFAULT_API_URL, DEFAULT_PAGE_SIZE, MAX_PAGES, RemoteListing, RemoteRepo, RepoPayload,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("repolink/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github.v3+json";

/// Anything that can list the repositories visible to an access token.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn fetch_all_repositories(&self, access_token: &str)
    -> Result<RemoteListing, GitHubError>;
}

/// Settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub api_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

/// Stateless client for `GET /user/repos`.
#[derive(Clone)]
pub struct GitHubClient {
    api_url: String,
    page_size: u32,
    retry: RetryConfig,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Build a client backed by reqwest with the configured request timeout.
    pub fn new(config: GitHubClientConfig) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(config.timeout)?;
        Ok(Self::new_with_transport(config, Arc::new(transport)))
    }

    pub fn new_with_transport(config: GitHubClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, DEFAULT_PAGE_SIZE),
            retry: config.retry,
            transport,
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/user/repos?per_page={}&page={}&sort=updated",
            self.api_url, self.page_size, page
        )
    }

    /// One attempt at one page.
    async fn fetch_page(&self, token: &str, page: u32) -> Result<Vec<RepoPayload>, GitHubError> {
        let request = HttpRequest::get(self.page_url(page))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Authorization", format!("Bearer {token}"));

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| GitHubError::Transient {
                status: None,
                message: e.to_string(),
            })?;

        classify_status(&response)?;
        Ok(serde_json::from_slice(&response.body)?)
    }
}

fn is_rate_limited(response: &HttpResponse) -> bool {
    response.header("retry-after").is_some()
        || response.header("x-ratelimit-remaining") == Some("0")
}

/// Map a response status onto the error taxonomy. `Ok` for 2xx.
fn classify_status(response: &HttpResponse) -> Result<(), GitHubError> {
    let status = response.status;
    match status {
        200..=299 => Ok(()),
        401 => Err(GitHubError::AuthFailed { status }),
        403 if !is_rate_limited(response) => Err(GitHubError::AuthFailed { status }),
        403 | 429 | 500..=599 => Err(GitHubError::Transient {
            status: Some(status),
            message: short_error_message(&response.body),
        }),
        _ => Err(GitHubError::Api {
            status,
            message: short_error_message(&response.body),
        }),
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn fetch_all_repositories(
        &self,
        access_token: &str,
    ) -> Result<RemoteListing, GitHubError> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(GitHubError::MissingToken);
        }

        let mut listing = RemoteListing::default();
        let mut page = 1u32;

        loop {
            let outcome = with_retry(
                || self.fetch_page(token, page),
                &self.retry,
                GitHubError::is_transient,
                "list user repos",
            )
            .await;

            let items = match outcome {
                Ok((items, _)) => items,
                Err((GitHubError::Api { status, message }, _)) => {
                    tracing::warn!(
                        page,
                        status,
                        %message,
                        collected = listing.repos.len(),
                        "stopping pagination on non-success status"
                    );
                    listing.truncated = true;
                    break;
                }
                Err((err, attempts)) if err.is_transient() => {
                    return Err(GitHubError::Unavailable {
                        attempts,
                        last_error: err.to_string(),
                    });
                }
                Err((err, _)) => return Err(err),
            };

            let count = items.len();
            listing.repos.extend(items.into_iter().map(RemoteRepo::from));
            tracing::debug!(page, count, "fetched repository page");

            if count < self.page_size as usize {
                break;
            }
            if page >= MAX_PAGES {
                tracing::warn!(page, "page limit reached, listing may be incomplete");
                listing.truncated = true;
                break;
            }
            page += 1;
        }

        tracing::info!(
            repos = listing.repos.len(),
            truncated = listing.truncated,
            "fetched repository listing"
        );
        Ok(listing)
    }
}
