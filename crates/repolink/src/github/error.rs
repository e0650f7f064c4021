//! GitHub API error types.

use thiserror::Error;

/// Errors that can occur when listing repositories from GitHub.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// No usable access token; nothing was sent upstream.
    #[error("No GitHub access token available")]
    MissingToken,

    /// The token was rejected. Never retried.
    #[error("GitHub rejected the access token (HTTP {status})")]
    AuthFailed { status: u16 },

    /// A non-success status that is neither an auth failure nor transient.
    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A failure worth retrying: transport error, timeout, 5xx, 429 or a
    /// rate-limited 403.
    #[error("Transient GitHub failure: {message}")]
    Transient { status: Option<u16>, message: String },

    /// Transient failures persisted through every attempt.
    #[error("GitHub unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: usize, last_error: String },

    #[error("Invalid GitHub response: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] crate::http::HttpError),
}

impl GitHubError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GitHubError::Transient { .. })
    }

    /// Whether the failure means the credential is unusable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, GitHubError::MissingToken | GitHubError::AuthFailed { .. })
    }
}

/// Truncate an upstream error body for logs and error messages.
pub fn short_error_message(body: &[u8]) -> String {
    const MAX_LEN: usize = 200;
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() <= MAX_LEN {
        return text.to_string();
    }
    let mut short: String = text.chars().take(MAX_LEN).collect();
    short.push('…');
    short
}
