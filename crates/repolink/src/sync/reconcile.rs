//! Merge a fetched listing into the store.
//!
//! Planning is pure: [`plan`] compares the listing with the rows loaded for
//! the user and decides every write. [`reconcile`] loads those rows, applies
//! the plan and stamps `users.last_synced_at` inside one transaction.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use uuid::Uuid;

use crate::entity::{github_repository, user_repository};
use crate::github::{RemoteListing, RemoteRepo};
use crate::repository;

use super::error::{Result, SyncError};
use super::types::ReconcileReport;

/// Collapse a listing to one entry per upstream id. The last occurrence wins.
pub fn dedupe(repos: Vec<RemoteRepo>) -> BTreeMap<i64, RemoteRepo> {
    repos.into_iter().map(|r| (r.github_id, r)).collect()
}

/// Every write one pass will make.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub creates: Vec<github_repository::ActiveModel>,
    pub updates: Vec<github_repository::ActiveModel>,
    pub new_links: Vec<user_repository::ActiveModel>,
    /// Link ids to flip back to enabled.
    pub reenable: Vec<Uuid>,
    /// Link ids to disable.
    pub disable: Vec<Uuid>,
    pub report: ReconcileReport,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty()
            && self.updates.is_empty()
            && self.new_links.is_empty()
            && self.reenable.is_empty()
            && self.disable.is_empty()
    }
}

fn new_link(
    user_id: Uuid,
    repository_id: Uuid,
    now: DateTime<FixedOffset>,
) -> user_repository::ActiveModel {
    user_repository::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        repository_id: Set(repository_id),
        disabled: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Decide the writes for one user.
///
/// `existing` holds the stored rows for the fetched ids; `links` holds all
/// of the user's links; `stale_repos` maps repository ids of links outside
/// the listing to their upstream ids.
pub fn plan(
    user_id: Uuid,
    remote: &BTreeMap<i64, RemoteRepo>,
    existing: &HashMap<i64, github_repository::Model>,
    links: &HashMap<Uuid, user_repository::Model>,
    stale_repos: &HashMap<Uuid, i64>,
    truncated: bool,
    now: DateTime<FixedOffset>,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan {
        report: ReconcileReport {
            fetched: remote.len(),
            truncated,
            ..ReconcileReport::default()
        },
        ..ReconcilePlan::default()
    };

    for (github_id, repo) in remote {
        let Some(stored) = existing.get(github_id) else {
            let repository_id = Uuid::new_v4();
            plan.creates.push(repo.to_new_model(repository_id, now));
            plan.new_links.push(new_link(user_id, repository_id, now));
            plan.report.created_ids.push(*github_id);
            plan.report.linked_ids.push(*github_id);
            continue;
        };

        if let Some(update) = repo.diff_against(stored, now) {
            plan.updates.push(update);
            plan.report.updated_ids.push(*github_id);
        }

        match links.get(&stored.id) {
            None => {
                plan.new_links.push(new_link(user_id, stored.id, now));
                plan.report.linked_ids.push(*github_id);
            }
            Some(link) if link.disabled => {
                plan.reenable.push(link.id);
                plan.report.reenabled_ids.push(*github_id);
            }
            Some(_) => {}
        }
    }

    if !truncated {
        for link in links.values().filter(|l| !l.disabled) {
            if let Some(github_id) = stale_repos.get(&link.repository_id) {
                plan.disable.push(link.id);
                plan.report.disabled_ids.push(*github_id);
            }
        }
    }

    plan.report.disabled_ids.sort_unstable();
    plan.report.applied_count = (plan.creates.len()
        + plan.updates.len()
        + plan.new_links.len()
        + plan.reenable.len()
        + plan.disable.len()) as u64;
    plan
}

/// Apply a fetched listing for `user_id` atomically.
///
/// # Errors
/// - [`SyncError::UserNotFound`] if the user does not exist.
/// - [`SyncError::NoData`] for an empty listing; nothing is written.
/// - [`SyncError::Store`] if any statement fails; the transaction is rolled
///   back and the store is unchanged.
pub async fn reconcile(
    db: &DatabaseConnection,
    user_id: Uuid,
    listing: RemoteListing,
) -> Result<ReconcileReport> {
    if listing.is_empty() {
        return Err(SyncError::NoData);
    }

    let truncated = listing.truncated;
    let remote = dedupe(listing.repos);
    let github_ids: Vec<i64> = remote.keys().copied().collect();
    let now = Utc::now().fixed_offset();

    let txn = db.begin().await?;

    if repository::find_user(&txn, user_id).await?.is_none() {
        return Err(SyncError::UserNotFound(user_id));
    }

    let existing: HashMap<i64, github_repository::Model> =
        repository::find_by_github_ids(&txn, &github_ids)
            .await?
            .into_iter()
            .map(|m| (m.github_id, m))
            .collect();

    let links: HashMap<Uuid, user_repository::Model> =
        repository::find_links_for_user(&txn, user_id)
            .await?
            .into_iter()
            .map(|l| (l.repository_id, l))
            .collect();

    let current_repo_ids: std::collections::HashSet<Uuid> =
        existing.values().map(|m| m.id).collect();
    let stale_ids: Vec<Uuid> = links
        .values()
        .filter(|l| !l.disabled && !current_repo_ids.contains(&l.repository_id))
        .map(|l| l.repository_id)
        .collect();
    let stale_repos: HashMap<Uuid, i64> = if truncated {
        HashMap::new()
    } else {
        repository::find_by_ids(&txn, &stale_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m.github_id))
            .collect()
    };

    let plan = plan(
        user_id,
        &remote,
        &existing,
        &links,
        &stale_repos,
        truncated,
        now,
    );

    if !plan.is_empty() {
        repository::insert_repositories(&txn, plan.creates).await?;
        repository::update_repositories(&txn, plan.updates).await?;
        repository::insert_links(&txn, plan.new_links).await?;
        repository::set_links_disabled(&txn, &plan.reenable, false, now).await?;
        repository::set_links_disabled(&txn, &plan.disable, true, now).await?;
    }
    repository::mark_synced(&txn, user_id, now).await?;

    txn.commit().await?;

    let report = plan.report;
    tracing::info!(
        %user_id,
        fetched = report.fetched,
        applied = report.applied_count,
        created = report.created_ids.len(),
        updated = report.updated_ids.len(),
        linked = report.linked_ids.len(),
        reenabled = report.reenabled_ids.len(),
        disabled = report.disabled_ids.len(),
        truncated = report.truncated,
        "reconciliation committed"
    );
    Ok(report)
}
