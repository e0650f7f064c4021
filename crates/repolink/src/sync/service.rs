use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::credentials::CredentialSource;
use crate::github::{GitHubError, RepositorySource};
use crate::repository;

use super::error::{Result, SyncError};
use super::reconcile::reconcile;
use super::types::ReconcileReport;

/// Runs complete reconciliation passes: credential lookup, fetch, apply.
#[derive(Clone)]
pub struct SyncService {
    db: Arc<DatabaseConnection>,
    credentials: Arc<dyn CredentialSource>,
    source: Arc<dyn RepositorySource>,
}

impl SyncService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        credentials: Arc<dyn CredentialSource>,
        source: Arc<dyn RepositorySource>,
    ) -> Self {
        Self {
            db,
            credentials,
            source,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialSource> {
        &self.credentials
    }

    /// Run one pass for `user_id` in the current task.
    pub async fn run_pass(&self, user_id: Uuid) -> Result<ReconcileReport> {
        if repository::find_user(self.db.as_ref(), user_id).await?.is_none() {
            return Err(SyncError::UserNotFound(user_id));
        }

        let credentials = self
            .credentials
            .credentials(user_id)
            .await?
            .ok_or(SyncError::NoToken(user_id))?;
        let token = credentials
            .usable_token()
            .ok_or(SyncError::NoToken(user_id))?;

        tracing::debug!(%user_id, "fetching repositories");
        let listing = self
            .source
            .fetch_all_repositories(token)
            .await
            .map_err(|e| match e {
                GitHubError::MissingToken => SyncError::NoToken(user_id),
                other => SyncError::Upstream(other),
            })?;

        reconcile(self.db.as_ref(), user_id, listing).await
    }
}
