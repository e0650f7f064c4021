//! Integration tests for the sync scheduler.
//!
//! These tests run real passes on the tokio runtime against an in-memory
//! store, with a scripted repository source standing in for GitHub.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use repolink::connect_and_migrate;
use repolink::credentials::DbCredentialSource;
use repolink::github::{GitHubError, RemoteListing, RemoteRepo, RepositorySource};
use repolink::repository::{self, AccountLink};
use repolink::sync::{SyncError, SyncScheduler, SyncService, TriggerRejection};
use sea_orm::DatabaseConnection;
use tokio::sync::Notify;
use uuid::Uuid;

/// If exceeded, a pass is likely stuck.
const PASS_TIMEOUT: Duration = Duration::from_secs(10);

fn repo(github_id: i64, stars: i32) -> RemoteRepo {
    RemoteRepo {
        github_id,
        name: format!("repo-{github_id}"),
        full_name: format!("octo/repo-{github_id}"),
        html_url: format!("https://github.com/octo/repo-{github_id}"),
        description: None,
        stargazers_count: stars,
        forks_count: 0,
        language: None,
        private: false,
    }
}

/// Returns a fixed listing, optionally waiting for a release signal first.
struct ScriptedSource {
    repos: Vec<RemoteRepo>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    tokens: std::sync::Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn new(repos: Vec<RemoteRepo>) -> Self {
        Self {
            repos,
            gate: None,
            calls: AtomicUsize::new(0),
            tokens: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn gated(repos: Vec<RemoteRepo>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(repos)
        }
    }
}

#[async_trait]
impl RepositorySource for ScriptedSource {
    async fn fetch_all_repositories(&self, token: &str) -> Result<RemoteListing, GitHubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .expect("tokens lock")
            .push(token.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(RemoteListing::complete(self.repos.clone()))
    }
}

/// Always fails the way an upstream outage does.
struct DownSource;

#[async_trait]
impl RepositorySource for DownSource {
    async fn fetch_all_repositories(&self, _: &str) -> Result<RemoteListing, GitHubError> {
        Err(GitHubError::Unavailable {
            attempts: 3,
            last_error: "HTTP 503".to_string(),
        })
    }
}

async fn setup_test_db() -> Arc<DatabaseConnection> {
    Arc::new(
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("Failed to create test database"),
    )
}

async fn linked_user(db: &DatabaseConnection, username: &str, token: Option<&str>) -> Uuid {
    let user = repository::create_user(db, username)
        .await
        .expect("create user");
    repository::link_account(
        db,
        user.id,
        AccountLink {
            provider_login: username.to_string(),
            access_token: token.map(str::to_string),
            avatar_url: None,
        },
    )
    .await
    .expect("link account");
    user.id
}

fn scheduler(
    db: &Arc<DatabaseConnection>,
    source: Arc<dyn RepositorySource>,
    window: Duration,
) -> SyncScheduler {
    let service = SyncService::new(
        Arc::clone(db),
        Arc::new(DbCredentialSource::new(Arc::clone(db))),
        source,
    );
    SyncScheduler::new(service, window)
}

#[tokio::test]
async fn accepted_trigger_runs_a_full_pass() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db, "alice", Some("ghp_alice")).await;
    let source = Arc::new(ScriptedSource::new(vec![repo(1, 5), repo(2, 10)]));
    let scheduler = scheduler(&db, source.clone(), Duration::from_secs(60));

    let ticket = scheduler.trigger(user_id).expect("accepted");
    let report = tokio::time::timeout(PASS_TIMEOUT, ticket.wait())
        .await
        .expect("pass finished in time")
        .expect("pass succeeded");

    assert_eq!(report.created_ids, vec![1, 2]);
    assert_eq!(
        source.tokens.lock().expect("tokens lock").as_slice(),
        ["ghp_alice"]
    );
    assert!(!scheduler.is_running(user_id));
}

#[tokio::test]
async fn second_trigger_in_window_is_rate_limited() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db, "alice", Some("t")).await;
    let source = Arc::new(ScriptedSource::new(vec![repo(1, 5)]));
    let scheduler = scheduler(&db, source.clone(), Duration::from_secs(60));

    scheduler
        .trigger(user_id)
        .expect("accepted")
        .wait()
        .await
        .expect("pass");

    match scheduler.trigger(user_id) {
        Err(TriggerRejection::RateLimited { retry_after }) => {
            assert!(retry_after <= Duration::from_secs(60));
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    // Other users have their own window.
    let bob = linked_user(&db, "bob", Some("t")).await;
    assert!(scheduler.trigger(bob).is_ok());
}

#[tokio::test]
async fn trigger_while_running_is_rejected_and_marker_is_released() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db, "alice", Some("t")).await;
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::gated(vec![repo(1, 5)], Arc::clone(&gate)));
    let scheduler = scheduler(&db, source, Duration::ZERO);

    let ticket = scheduler.trigger(user_id).expect("accepted");
    assert!(scheduler.is_running(user_id));
    assert!(matches!(
        scheduler.trigger(user_id),
        Err(TriggerRejection::AlreadyRunning)
    ));

    gate.notify_one();
    tokio::time::timeout(PASS_TIMEOUT, ticket.wait())
        .await
        .expect("pass finished in time")
        .expect("pass succeeded");

    assert!(!scheduler.is_running(user_id));
    gate.notify_one();
    scheduler
        .trigger(user_id)
        .expect("accepted again")
        .wait()
        .await
        .expect("second pass");
}

#[tokio::test]
async fn failed_pass_releases_marker_and_keeps_state() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db, "alice", Some("t")).await;
    repolink::sync::reconcile(
        &db,
        user_id,
        RemoteListing::complete(vec![repo(1, 5)]),
    )
    .await
    .expect("seed");

    let scheduler = scheduler(&db, Arc::new(DownSource), Duration::ZERO);
    let err = scheduler
        .trigger(user_id)
        .expect("accepted")
        .wait()
        .await
        .expect_err("upstream down");

    assert_eq!(err.reason(), "upstream_unavailable");
    assert!(!scheduler.is_running(user_id));
    let links = repository::find_links_for_user(db.as_ref(), user_id)
        .await
        .expect("links");
    assert_eq!(links.len(), 1);
    assert!(!links[0].disabled);
}

#[tokio::test]
async fn pass_without_token_fails_with_no_token() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db, "alice", None).await;
    let source = Arc::new(ScriptedSource::new(vec![repo(1, 5)]));
    let scheduler = scheduler(&db, source.clone(), Duration::ZERO);

    let err = scheduler
        .trigger(user_id)
        .expect("accepted")
        .wait()
        .await
        .expect_err("no token");
    assert!(matches!(err, SyncError::NoToken(id) if id == user_id));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn login_trigger_requires_linked_account() {
    let db = setup_test_db().await;
    let unlinked = repository::create_user(db.as_ref(), "carol")
        .await
        .expect("create user")
        .id;
    let linked = linked_user(&db, "alice", Some("t")).await;
    let source = Arc::new(ScriptedSource::new(vec![repo(1, 5)]));
    let scheduler = scheduler(&db, source.clone(), Duration::from_secs(60));

    let skipped = scheduler
        .trigger_on_login(unlinked)
        .await
        .expect("lookup succeeded");
    assert!(skipped.is_none());

    let ticket = scheduler
        .trigger_on_login(linked)
        .await
        .expect("lookup succeeded")
        .expect("linked user triggers");
    ticket.wait().await.expect("pass");

    // Login triggers share the interactive rate limit.
    assert!(matches!(
        scheduler.trigger_on_login(linked).await,
        Err(TriggerRejection::RateLimited { .. })
    ));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}
