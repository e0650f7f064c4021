use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Record not found.
    #[error("Not found: {context}")]
    NotFound { context: String },

    /// A record with the same unique key already exists.
    #[error("Already exists: {context}")]
    Duplicate { context: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepositoryError {
    /// Create a NotFound error for a user id lookup.
    pub fn user_not_found(id: Uuid) -> Self {
        Self::NotFound {
            context: format!("user id={id}"),
        }
    }

    /// Create a NotFound error for a username lookup.
    pub fn username_not_found(username: &str) -> Self {
        Self::NotFound {
            context: format!("user {username}"),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
