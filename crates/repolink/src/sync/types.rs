use std::time::Duration;

use serde::Serialize;

/// Default trigger window: one accepted trigger per user per minute.
pub const DEFAULT_SYNC_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of one committed reconciliation pass.
///
/// All id lists hold upstream (GitHub) ids, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Distinct repositories in the fetched listing.
    pub fetched: usize,
    /// Rows written: repository inserts and updates plus link inserts and
    /// flips. Zero for a pass over an unchanged listing.
    pub applied_count: u64,
    /// Repositories inserted into the store by this pass.
    pub created_ids: Vec<i64>,
    /// Existing repositories whose fields changed.
    pub updated_ids: Vec<i64>,
    /// Repositories newly linked to the user, created or pre-existing.
    pub linked_ids: Vec<i64>,
    /// Links flipped back from disabled.
    pub reenabled_ids: Vec<i64>,
    /// Links disabled because the repository dropped out of the listing.
    pub disabled_ids: Vec<i64>,
    /// The listing was partial, so no links were disabled.
    pub truncated: bool,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.applied_count == 0
    }
}
