//! Session token payload.

use serde::{Deserialize, Serialize};

use lumiere_core::{AdminRole, AdminUserId, Email};

/// What a sealed session cookie carries. Timestamps are Unix seconds.
///
/// `email` and `role` describe the admin at issue time; the session manager
/// re-reads both from the identity store on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: AdminUserId,
    pub email: Email,
    pub role: AdminRole,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    #[must_use]
    pub const fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}
