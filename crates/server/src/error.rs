//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry and answered with a generic message; client mistakes
//! come back as 4xx with a readable `{"error": "..."}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use wishlisted_core::ValidationError;

use crate::db::RepositoryError;
use crate::services::{AuthError, PledgeError, VerificationError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Pledge workflow rejected the request.
    #[error("Pledge error: {0}")]
    Pledge(#[from] PledgeError),

    /// Verification queue operation failed.
    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    /// Input failed a field rule.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role may not do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string()),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                AuthError::UserAlreadyExists => (StatusCode::CONFLICT, err.to_string()),
                AuthError::InvalidEmail(_)
                | AuthError::Validation(_)
                | AuthError::RoleNotAllowed => (StatusCode::BAD_REQUEST, err.to_string()),
                AuthError::Repository(inner) => repository_status(inner),
                AuthError::PasswordHash => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            Self::Pledge(err) => match err {
                PledgeError::Input(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                PledgeError::Quantity(_)
                | PledgeError::Transition(_)
                | PledgeError::Stale
                | PledgeError::WishlistInactive => (StatusCode::CONFLICT, err.to_string()),
                PledgeError::NoDonorProfile => {
                    (StatusCode::PRECONDITION_REQUIRED, err.to_string())
                }
                PledgeError::NotFound | PledgeError::ItemNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                PledgeError::BankingUnavailable => (StatusCode::FORBIDDEN, err.to_string()),
                PledgeError::Repository(inner) => repository_status(inner),
            },
            Self::Verification(err) => match err {
                VerificationError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                VerificationError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                VerificationError::Repository(inner) => repository_status(inner),
            },
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, slow down".to_string(),
            ),
        }
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::StaleState => (
            StatusCode::CONFLICT,
            "Record was changed by another request, reload and try again".to_string(),
        ),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
