use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::repository;

use super::AppState;
use super::error::ServerError;

/// Header set by the authenticating proxy in front of the server.
pub const USER_HEADER: &str = "x-authenticated-user";

/// A request from a known user, identified by [`USER_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(ServerError::Unauthenticated)?;

        match repository::find_user(state.db.as_ref(), user_id).await {
            Ok(Some(_)) => Ok(AuthenticatedUser(user_id)),
            Ok(None) => Err(ServerError::Unauthenticated),
            Err(e) => Err(ServerError::Internal(e.to_string())),
        }
    }
}
