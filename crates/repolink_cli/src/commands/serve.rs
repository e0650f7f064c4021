//! HTTP server exposing the trigger and browse endpoints.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use repolink::credentials::DbCredentialSource;
use repolink::github::GitHubClient;
use repolink::server::{self, AppState, USER_HEADER};
use repolink::sync::{SyncScheduler, SyncService};

use crate::config::Config;
use crate::shutdown::shutdown_signal;

pub(crate) async fn handle_serve(
    bind: Option<String>,
    config: &Config,
    db: Arc<DatabaseConnection>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let window = config.sync_window();

    let client = GitHubClient::new(config.client_config())?;
    let service = SyncService::new(
        Arc::clone(&db),
        Arc::new(DbCredentialSource::new(Arc::clone(&db))),
        Arc::new(client),
    );
    let scheduler = SyncScheduler::new(service, window);
    let state = AppState::new(db, scheduler);

    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|e| format!("Failed to bind {bind}: {e}"))?;

    tracing::info!(
        window_secs = window.as_secs(),
        user_header = USER_HEADER,
        "serving repository API"
    );
    server::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("server stopped");

    Ok(())
}
