use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::browse::BrowseError;
use crate::sync::TriggerRejection;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Sync already triggered recently")]
    RateLimited { retry_after: Duration },

    #[error("A sync is already running")]
    AlreadyRunning,

    #[error("Not found")]
    NotFound { reason: &'static str },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServerError::AlreadyRunning => StatusCode::CONFLICT,
            ServerError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            ServerError::Unauthenticated => "unauthenticated",
            ServerError::RateLimited { .. } => "rate_limited",
            ServerError::AlreadyRunning => "already_running",
            ServerError::NotFound { reason } => reason,
            ServerError::Internal(_) => "internal_error",
        }
    }
}

/// Whole seconds, rounded up, for the `Retry-After` header.
pub(crate) fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

impl From<TriggerRejection> for ServerError {
    fn from(rejection: TriggerRejection) -> Self {
        match rejection {
            TriggerRejection::RateLimited { retry_after } => ServerError::RateLimited { retry_after },
            TriggerRejection::AlreadyRunning => ServerError::AlreadyRunning,
            TriggerRejection::Lookup(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<BrowseError> for ServerError {
    fn from(err: BrowseError) -> Self {
        match err {
            BrowseError::InvalidPagination { .. } | BrowseError::PageOutOfRange { .. } => {
                ServerError::NotFound {
                    reason: err.reason(),
                }
            }
            BrowseError::Store(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ServerError::Internal(message) = &self {
            tracing::error!(%message, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "reason": self.reason(),
        }));
        let mut response = (status, body).into_response();

        if let ServerError::RateLimited { retry_after } = self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs(retry_after)),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_rounds_up_to_whole_seconds() {
        assert_eq!(retry_after_secs(Duration::from_millis(59_001)), 60);
        assert_eq!(retry_after_secs(Duration::from_secs(60)), 60);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn rate_limited_response_carries_retry_after() {
        let response = ServerError::RateLimited {
            retry_after: Duration::from_secs(42),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from(42u64))
        );
    }

    #[test]
    fn pagination_errors_map_to_not_found() {
        let err = ServerError::from(BrowseError::InvalidPagination {
            message: "page_num".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.reason(), "invalid_pagination_params");
    }
}
