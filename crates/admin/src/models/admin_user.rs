//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lumiere_core::{AdminRole, AdminUserId, Email};

/// An admin account (domain type). Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub role: AdminRole,
    /// Inactive accounts cannot sign in and their sessions stop resolving.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An admin account together with its stored Argon2 PHC hash.
///
/// Only produced for credential verification.
#[derive(Clone)]
pub struct AdminCredentials {
    pub user: AdminUser,
    pub password_hash: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
