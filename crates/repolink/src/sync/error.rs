use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::github::GitHubError;
use crate::repository::RepositoryError;

/// Why a reconciliation pass did not commit.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// No linked account, or a linked account without a usable token.
    #[error("No usable GitHub token for user {0}")]
    NoToken(Uuid),

    /// The upstream listing was empty. Nothing was disabled.
    #[error("GitHub returned no repositories")]
    NoData,

    /// The fetch failed; local state is untouched.
    #[error("GitHub fetch failed: {0}")]
    Upstream(#[source] GitHubError),

    /// The apply transaction failed and was rolled back.
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    /// The background task panicked or was cancelled.
    #[error("Sync task interrupted: {0}")]
    Interrupted(String),
}

impl From<DbErr> for SyncError {
    fn from(err: DbErr) -> Self {
        SyncError::Store(RepositoryError::Database(err))
    }
}

impl SyncError {
    /// Stable reason code for logs and API responses.
    pub fn reason(&self) -> &'static str {
        match self {
            SyncError::UserNotFound(_) => "user_not_found",
            SyncError::NoToken(_) => "no_token",
            SyncError::NoData => "no_data",
            SyncError::Upstream(e) if e.is_auth_failure() => "upstream_auth_failed",
            SyncError::Upstream(_) => "upstream_unavailable",
            SyncError::Store(_) => "store_error",
            SyncError::Interrupted(_) => "interrupted",
        }
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
