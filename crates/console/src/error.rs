//! Unified error handling for the console.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;

/// Application-level error type for handler plumbing.
///
/// Expected failures (validation, backend rejections, fetch errors on list
/// screens) are handled inside the screens as field errors, flashes, or the
/// Errored view - they never reach this type. What lands here is the
/// machinery failing: the session store, template rendering, or a backend
/// call in a place that has no screen-level recovery.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed with no screen-level handling in scope.
    #[error("backend error: {0}")]
    Backend(#[from] ApiError),

    /// Session read/write failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Report server-side faults
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Console request error"
        );

        let status = match &self {
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Backend(_) => "Backend service error",
            Self::Session(_) | Self::Internal(_) => "Internal server error",
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "internal error: boom");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Backend(ApiError::Api {
                status: StatusCode::NOT_FOUND,
                message: None,
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_responses_do_not_leak_details() {
        let response = AppError::Internal("secret pool address".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
