use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::browse::{self, BrowsePage};

use super::AppState;
use super::auth::AuthenticatedUser;
use super::error::ServerError;

/// `POST /github/repos/sync`
pub async fn trigger_sync(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<(StatusCode, Json<Value>), ServerError> {
    let ticket = state.scheduler.trigger(user_id)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted", "user_id": ticket.user_id() })),
    ))
}

/// Raw query values; validation happens in [`browse::browse`].
#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
}

/// `GET /github/repos`
pub async fn list_repos(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(params): Query<BrowseParams>,
) -> Result<Json<BrowsePage>, ServerError> {
    let page = browse::browse(
        state.db.as_ref(),
        user_id,
        params.page_num.as_deref(),
        params.page_size.as_deref(),
    )
    .await?;
    Ok(Json(page))
}
