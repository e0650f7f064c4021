//! HTTP surface: the sync trigger and the browse listing.
//!
//! The server trusts an authenticating proxy to set
//! [`USER_HEADER`](auth::USER_HEADER) to the caller's user id.

mod auth;
mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use crate::sync::SyncScheduler;

pub use auth::{AuthenticatedUser, USER_HEADER};
pub use error::ServerError;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub scheduler: SyncScheduler,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, scheduler: SyncScheduler) -> Self {
        Self { db, scheduler }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/github/repos", get(handlers::list_repos))
        .route("/github/repos/sync", post(handlers::trigger_sync))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::credentials::DbCredentialSource;
    use crate::github::{GitHubError, RemoteListing, RemoteRepo, RepositorySource};
    use crate::repository::{self, AccountLink};
    use crate::sync::{SyncService, reconcile};

    struct NoRepos;

    #[async_trait]
    impl RepositorySource for NoRepos {
        async fn fetch_all_repositories(&self, _: &str) -> Result<RemoteListing, GitHubError> {
            Ok(RemoteListing::default())
        }
    }

    async fn setup() -> (AppState, Uuid) {
        let db = Arc::new(
            crate::connect_and_migrate("sqlite::memory:")
                .await
                .expect("migrate"),
        );
        let user = repository::create_user(db.as_ref(), "dana").await.expect("user");
        let service = SyncService::new(
            Arc::clone(&db),
            Arc::new(DbCredentialSource::new(Arc::clone(&db))),
            Arc::new(NoRepos),
        );
        let scheduler = SyncScheduler::new(service, Duration::from_secs(60));
        (AppState::new(db, scheduler), user.id)
    }

    fn request(method: &str, uri: &str, user: Option<Uuid>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user.to_string());
        }
        builder.body(Body::empty()).expect("request")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn repo(github_id: i64, full_name: &str, stars: i32) -> RemoteRepo {
        RemoteRepo {
            github_id,
            name: full_name.rsplit('/').next().unwrap_or_default().to_string(),
            full_name: full_name.to_string(),
            html_url: format!("https://github.com/{full_name}"),
            description: None,
            stargazers_count: stars,
            forks_count: 0,
            language: None,
            private: false,
        }
    }

    #[tokio::test]
    async fn unauthenticated_requests_get_401() {
        let (state, _) = setup().await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(request("POST", "/github/repos/sync", None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(request("GET", "/github/repos", Some(Uuid::new_v4())))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn trigger_accepts_once_then_rate_limits() {
        let (state, user_id) = setup().await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(request("POST", "/github/repos/sync", Some(user_id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        // Let the background pass release its in-flight marker.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let response = app
            .oneshot(request("POST", "/github/repos/sync", Some(user_id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_some());
    }

    #[tokio::test]
    async fn trigger_rejects_other_methods() {
        let (state, user_id) = setup().await;
        let response = router(state)
            .oneshot(request("GET", "/github/repos/sync", Some(user_id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn browse_without_account_explains_and_lists_nothing() {
        let (state, user_id) = setup().await;
        let response = router(state)
            .oneshot(request("GET", "/github/repos", Some(user_id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["error"], crate::browse::ACCOUNT_NOT_FOUND);
        assert_eq!(body["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn browse_orders_by_stars_and_validates_pages() {
        let (state, user_id) = setup().await;
        repository::link_account(
            state.db.as_ref(),
            user_id,
            AccountLink {
                provider_login: "dana".to_string(),
                access_token: Some("tok".to_string()),
                avatar_url: Some("https://avatars.example/dana".to_string()),
            },
        )
        .await
        .expect("link");
        reconcile(
            state.db.as_ref(),
            user_id,
            RemoteListing::complete(vec![repo(1, "dana/a", 5), repo(2, "dana/b", 10)]),
        )
        .await
        .expect("reconcile");

        let app = router(state);
        let response = app
            .clone()
            .oneshot(request("GET", "/github/repos", Some(user_id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let names: Vec<&str> = body["items"]
            .as_array()
            .expect("items")
            .iter()
            .filter_map(|item| item["full_name"].as_str())
            .collect();
        assert_eq!(names, vec!["dana/b", "dana/a"]);
        assert_eq!(body["avatar_url"], "https://avatars.example/dana");

        for uri in [
            "/github/repos?page_num=0",
            "/github/repos?page_size=0",
            "/github/repos?page_num=notint",
            "/github/repos?page_num=2",
        ] {
            let response = app
                .clone()
                .oneshot(request("GET", uri, Some(user_id)))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
