//! The authenticated admin identity attached to a request.

use serde::Serialize;

use lumiere_core::{AdminRole, AdminUserId, Email, Permission};

use super::admin_user::AdminUser;

/// Identity resolved from a valid session cookie.
///
/// Email and role always come from the identity store at request time, not
/// from the cookie, so role changes take effect on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    pub id: AdminUserId,
    pub email: Email,
    pub role: AdminRole,
}

impl AdminSession {
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }
}

impl From<&AdminUser> for AdminSession {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}
