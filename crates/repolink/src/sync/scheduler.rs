//! Rate-limited, fire-and-forget entry point for reconciliation passes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::repository::RepositoryError;

use super::error::{Result, SyncError};
use super::rate_limit::TriggerRateLimiter;
use super::service::SyncService;
use super::types::ReconcileReport;

/// Why a trigger did not start a pass.
#[derive(Debug, Error)]
pub enum TriggerRejection {
    #[error("Sync already triggered recently; retry in {}s", .retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error("A sync is already running for this user")]
    AlreadyRunning,

    /// The login trigger could not look up the user's linked account.
    #[error("Credential lookup failed: {0}")]
    Lookup(#[from] RepositoryError),
}

/// Handle to a spawned pass. Dropping it leaves the pass running.
#[derive(Debug)]
pub struct SyncTicket {
    user_id: Uuid,
    handle: JoinHandle<Result<ReconcileReport>>,
}

impl SyncTicket {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Wait for the pass to finish.
    pub async fn wait(self) -> Result<ReconcileReport> {
        self.handle
            .await
            .map_err(|e| SyncError::Interrupted(e.to_string()))?
    }
}

type InFlight = Arc<Mutex<HashSet<Uuid>>>;

/// Removes the user from the in-flight set when the pass ends, however it ends.
struct InFlightGuard {
    in_flight: InFlight,
    user_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

#[derive(Clone)]
pub struct SyncScheduler {
    service: SyncService,
    limiter: TriggerRateLimiter,
    in_flight: InFlight,
}

impl SyncScheduler {
    pub fn new(service: SyncService, window: Duration) -> Self {
        Self {
            service,
            limiter: TriggerRateLimiter::new(window),
            in_flight: Arc::default(),
        }
    }

    pub fn service(&self) -> &SyncService {
        &self.service
    }

    /// Whether a pass for `user_id` is currently running in this process.
    pub fn is_running(&self, user_id: Uuid) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user_id)
    }

    /// Start a pass for `user_id` in the background.
    ///
    /// # Errors
    /// [`TriggerRejection::AlreadyRunning`] while a pass for the user is in
    /// flight, [`TriggerRejection::RateLimited`] when the user already
    /// triggered within the window.
    pub fn trigger(&self, user_id: Uuid) -> std::result::Result<SyncTicket, TriggerRejection> {
        let guard = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if in_flight.contains(&user_id) {
                return Err(TriggerRejection::AlreadyRunning);
            }
            self.limiter
                .check(&user_id)
                .map_err(|retry_after| TriggerRejection::RateLimited { retry_after })?;
            in_flight.insert(user_id);
            InFlightGuard {
                in_flight: Arc::clone(&self.in_flight),
                user_id,
            }
        };
        self.limiter.retain_recent();

        let service = self.service.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let result = service.run_pass(user_id).await;
            match &result {
                Ok(report) => tracing::info!(
                    %user_id,
                    fetched = report.fetched,
                    applied = report.applied_count,
                    "sync pass finished"
                ),
                Err(err) => tracing::warn!(
                    %user_id,
                    reason = err.reason(),
                    error = %err,
                    "sync pass failed"
                ),
            }
            result
        });

        tracing::debug!(%user_id, "sync pass scheduled");
        Ok(SyncTicket { user_id, handle })
    }

    /// Login-event entry point: triggers only for users with a linked account.
    pub async fn trigger_on_login(
        &self,
        user_id: Uuid,
    ) -> std::result::Result<Option<SyncTicket>, TriggerRejection> {
        if self.service.credentials().credentials(user_id).await?.is_none() {
            tracing::debug!(%user_id, "no linked account, skipping login sync");
            return Ok(None);
        }
        self.trigger(user_id).map(Some)
    }
}
