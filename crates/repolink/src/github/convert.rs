//! Conversions between upstream payloads, normalized repos and entity models.

use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveValue::NotSet, Set};
use uuid::Uuid;

use crate::entity::github_repository::{ActiveModel, Model};

use super::types::{RemoteRepo, RepoPayload};

fn clamp_count(count: Option<i64>) -> i32 {
    count
        .unwrap_or(0)
        .clamp(0, i64::from(i32::MAX))
        .try_into()
        .unwrap_or(i32::MAX)
}

impl From<RepoPayload> for RemoteRepo {
    fn from(payload: RepoPayload) -> Self {
        Self {
            github_id: payload.id,
            name: payload.name.unwrap_or_default(),
            full_name: payload.full_name.unwrap_or_default(),
            html_url: payload.html_url.unwrap_or_default(),
            description: payload.description,
            stargazers_count: clamp_count(payload.stargazers_count),
            forks_count: clamp_count(payload.forks_count),
            language: payload.language,
            private: payload.private.unwrap_or(false),
        }
    }
}

impl RemoteRepo {
    /// A fresh row for a repository the store has never seen.
    pub fn to_new_model(&self, id: Uuid, now: DateTime<FixedOffset>) -> ActiveModel {
        ActiveModel {
            id: Set(id),
            github_id: Set(self.github_id),
            name: Set(self.name.clone()),
            full_name: Set(self.full_name.clone()),
            html_url: Set(self.html_url.clone()),
            description: Set(self.description.clone()),
            language: Set(self.language.clone()),
            private: Set(self.private),
            stargazers_count: Set(self.stargazers_count),
            forks_count: Set(self.forks_count),
            synced_at: Set(now),
        }
    }

    /// An update touching only the columns that differ from `existing`, or
    /// `None` when the stored row already matches.
    pub fn diff_against(&self, existing: &Model, now: DateTime<FixedOffset>) -> Option<ActiveModel> {
        let mut update = ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(existing.id),
            github_id: NotSet,
            name: NotSet,
            full_name: NotSet,
            html_url: NotSet,
            description: NotSet,
            language: NotSet,
            private: NotSet,
            stargazers_count: NotSet,
            forks_count: NotSet,
            synced_at: NotSet,
        };
        let mut changed = false;

        macro_rules! diff_field {
            ($field:ident) => {
                if existing.$field != self.$field {
                    update.$field = Set(self.$field.clone());
                    changed = true;
                }
            };
        }

        diff_field!(name);
        diff_field!(full_name);
        diff_field!(html_url);
        diff_field!(description);
        diff_field!(language);
        diff_field!(private);
        diff_field!(stargazers_count);
        diff_field!(forks_count);

        if !changed {
            return None;
        }
        update.synced_at = Set(now);
        Some(update)
    }
}
