//! Credential verification error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while verifying or setting admin passwords.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, inactive account, unreadable hash, or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Password does not meet the policy.
    #[error("{0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Identity store error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
