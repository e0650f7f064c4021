//! Credential lookup for reconciliation passes.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::repository::{self, RepositoryError};

/// What a linked account provides to a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Upstream access token. `None` or blank means no usable credential.
    pub token: Option<String>,
    pub avatar_url: Option<String>,
}

impl Credentials {
    /// The token, if present and not blank.
    pub fn usable_token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Source of upstream credentials per user. `Ok(None)` means the user has no
/// linked account.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, RepositoryError>;
}

/// Reads credentials from the `linked_accounts` table.
#[derive(Debug, Clone)]
pub struct DbCredentialSource {
    db: Arc<DatabaseConnection>,
}

impl DbCredentialSource {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialSource for DbCredentialSource {
    async fn credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, RepositoryError> {
        let account = repository::find_account_for_user(self.db.as_ref(), user_id).await?;
        Ok(account.map(|a| Credentials {
            token: a.access_token,
            avatar_url: a.avatar_url,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_are_not_usable() {
        let creds = Credentials {
            token: Some(" \t".to_string()),
            avatar_url: None,
        };
        assert_eq!(creds.usable_token(), None);
        assert_eq!(Credentials::default().usable_token(), None);

        let creds = Credentials {
            token: Some("ghp_x".to_string()),
            avatar_url: None,
        };
        assert_eq!(creds.usable_token(), Some("ghp_x"));
    }

    #[cfg(all(feature = "sqlite", feature = "migrate"))]
    #[tokio::test]
    async fn db_source_reads_linked_account() {
        let db = Arc::new(
            crate::connect_and_migrate("sqlite::memory:")
                .await
                .expect("migrate"),
        );
        let user = repository::create_user(db.as_ref(), "carol").await.expect("user");
        let source = DbCredentialSource::new(Arc::clone(&db));

        assert_eq!(source.credentials(user.id).await.expect("lookup"), None);

        repository::link_account(
            db.as_ref(),
            user.id,
            repository::AccountLink {
                provider_login: "carol".to_string(),
                access_token: Some("tok".to_string()),
                avatar_url: Some("https://avatars.example/carol".to_string()),
            },
        )
        .await
        .expect("link");

        let creds = source
            .credentials(user.id)
            .await
            .expect("lookup")
            .expect("linked");
        assert_eq!(creds.usable_token(), Some("tok"));
        assert_eq!(creds.avatar_url.as_deref(), Some("https://avatars.example/carol"));
    }
}
