//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::admin_users::AdminUserError;
use crate::services::auth::AuthError;
use crate::services::session::SessionError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials rejected. Never says which part was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A collaborator (identity store) could not answer.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::WeakPassword(msg) => Self::BadRequest(msg),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
            AuthError::Repository(e) => Self::Unavailable(e.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unauthenticated => Self::Unauthorized("Not logged in".to_string()),
            SessionError::Forbidden => Self::Forbidden("Insufficient role".to_string()),
            SessionError::UpstreamUnavailable(e) => Self::Unavailable(e.to_string()),
            SessionError::Seal => Self::Internal("session sealing failed".to_string()),
        }
    }
}

impl From<AdminUserError> for AppError {
    fn from(err: AdminUserError) -> Self {
        match err {
            AdminUserError::NotFound => Self::NotFound("admin user".to_string()),
            AdminUserError::InvalidEmail(e) => Self::BadRequest(e.to_string()),
            AdminUserError::Conflict(msg) => Self::Conflict(msg),
            AdminUserError::Auth(e) => e.into(),
            AdminUserError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Unavailable(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidCredentials | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => format!("Conflict: {msg}"),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Unavailable(_) => "Service temporarily unavailable".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context from an admin session.
pub fn set_sentry_user(admin_user_id: i32, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 12".to_string());
        assert_eq!(err.to_string(), "Not found: order 12");

        let err = AppError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Unavailable("db down".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_statuses() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "email already exists".to_string()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_session_errors_map_to_statuses() {
        assert_eq!(
            get_status(SessionError::Unauthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(SessionError::Forbidden.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(SessionError::UpstreamUnavailable(RepositoryError::NotFound).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_admin_user_conflict_is_conflict() {
        let err: AppError = AdminUserError::Conflict("last super admin".to_string()).into();
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }
}
