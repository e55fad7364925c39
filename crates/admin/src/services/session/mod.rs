//! Admin session manager.
//!
//! Sessions are stateless: the cookie holds AES-256-GCM sealed claims and
//! nothing is stored server side. Every read opens the token, checks expiry,
//! and re-fetches the admin from the identity store, so deactivating or
//! deleting an account ends its sessions on the next request.
//!
//! ```text
//! no cookie ─┐
//! bad token ─┼─> absent
//! expired ───┤
//! inactive ──┘
//! valid ─────> AdminSession (current email and role from the store)
//! ```

mod cipher;
mod claims;
mod directory;

pub use cipher::SessionCipher;
pub use claims::SessionClaims;
pub use directory::{AdminDirectory, PgAdminDirectory};

#[cfg(test)]
pub use directory::memory;

use axum::http::{HeaderMap, header::COOKIE};
use chrono::Utc;
use secrecy::SecretString;
use thiserror::Error;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use lumiere_core::{AdminRole, Permission};

use crate::db::RepositoryError;
use crate::models::{AdminSession, AdminUser};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lumiere_admin_session";

/// Session lifetime in seconds (7 days).
pub const SESSION_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Errors from session checks.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No valid session.
    #[error("not authenticated")]
    Unauthenticated,

    /// Valid session, insufficient role or capability.
    #[error("forbidden")]
    Forbidden,

    /// The identity store could not be reached. Never treated as a grant.
    #[error("identity store unavailable: {0}")]
    UpstreamUnavailable(#[source] RepositoryError),

    /// Token could not be sealed.
    #[error("failed to seal session token")]
    Seal,
}

/// Issues, reads, and enforces admin sessions.
#[derive(Debug)]
pub struct SessionManager<D> {
    cipher: SessionCipher,
    directory: D,
    secure: bool,
}

impl<D: AdminDirectory> SessionManager<D> {
    /// Create a session manager.
    ///
    /// `secure` marks cookies `Secure`; set it when the console is served
    /// over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Seal` if the cipher cannot be derived.
    pub fn new(secret: &SecretString, directory: D, secure: bool) -> Result<Self, SessionError> {
        Ok(Self {
            cipher: SessionCipher::new(secret, SESSION_COOKIE_NAME)?,
            directory,
            secure,
        })
    }

    /// The identity store this manager reads from.
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    /// Issue a session cookie for an admin.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Seal` if the token cannot be sealed.
    pub fn issue_session(&self, admin: &AdminUser) -> Result<Cookie<'static>, SessionError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: admin.id,
            email: admin.email.clone(),
            role: admin.role,
            iat: now,
            exp: now + SESSION_MAX_AGE_SECONDS,
        };
        let token = self.cipher.seal(&claims)?;

        Ok(Cookie::build((SESSION_COOKIE_NAME, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(Duration::seconds(SESSION_MAX_AGE_SECONDS))
            .build())
    }

    /// Resolve the session carried by the request headers.
    ///
    /// Returns `Ok(None)` for a missing, malformed, tampered, or expired
    /// token and for a missing or inactive admin.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UpstreamUnavailable` if the identity store
    /// fails.
    pub async fn read_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<AdminSession>, SessionError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };
        let Some(claims) = self.cipher.open(&token) else {
            tracing::debug!("Rejected unreadable session token");
            return Ok(None);
        };
        if claims.is_expired(Utc::now().timestamp()) {
            tracing::debug!(admin_id = %claims.sub, "Rejected expired session token");
            return Ok(None);
        }

        let admin = self
            .directory
            .find_by_id(claims.sub)
            .await
            .map_err(SessionError::UpstreamUnavailable)?;

        match admin {
            Some(admin) if admin.is_active => Ok(Some(AdminSession::from(&admin))),
            Some(_) => {
                tracing::info!(admin_id = %claims.sub, "Session refused for inactive admin");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Require a session, optionally with a minimum role.
    ///
    /// # Errors
    ///
    /// - `SessionError::Unauthenticated` if there is no valid session
    /// - `SessionError::Forbidden` if the role is below `minimum`
    /// - `SessionError::UpstreamUnavailable` if the identity store fails
    pub async fn require_session(
        &self,
        headers: &HeaderMap,
        minimum: Option<AdminRole>,
    ) -> Result<AdminSession, SessionError> {
        let session = self
            .read_session(headers)
            .await?
            .ok_or(SessionError::Unauthenticated)?;

        if let Some(minimum) = minimum
            && !session.role.meets(minimum)
        {
            return Err(SessionError::Forbidden);
        }
        Ok(session)
    }

    /// A cookie that clears the session on the client.
    #[must_use]
    pub fn destroy_session(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .build();
        cookie.make_removal();
        cookie
    }
}

/// Require a capability from the session's role.
///
/// # Errors
///
/// Returns `SessionError::Forbidden` if the role lacks `permission`.
pub fn require_permission(
    session: &AdminSession,
    permission: Permission,
) -> Result<(), SessionError> {
    if session.can(permission) {
        Ok(())
    } else {
        Err(SessionError::Forbidden)
    }
}

/// Extract the raw session token from `Cookie` headers.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::memory::InMemoryDirectory;
    use super::*;

    const SECRET: &str = "k7#Qm2!zR9$wX4@pL6^tN8&vB3*yH5%d";

    fn manager() -> SessionManager<InMemoryDirectory> {
        SessionManager::new(&SecretString::from(SECRET), InMemoryDirectory::default(), true)
            .unwrap()
    }

    fn headers_with(cookie: &Cookie<'_>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("theme=dark; {}={}", cookie.name(), cookie.value());
        headers.insert(COOKIE, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_issue_then_read_returns_identity() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);

        let cookie = sessions.issue_session(&admin).unwrap();
        let session = sessions.read_session(&headers_with(&cookie)).await.unwrap();

        assert_eq!(session, Some(AdminSession::from(&admin)));
    }

    #[tokio::test]
    async fn test_cookie_attributes() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let cookie = sessions.issue_session(&admin).unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(Duration::seconds(SESSION_MAX_AGE_SECONDS))
        );
    }

    #[tokio::test]
    async fn test_missing_cookie_is_absent() {
        let sessions = manager();
        assert_eq!(sessions.read_session(&HeaderMap::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_deactivated_admin_is_absent() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let cookie = sessions.issue_session(&admin).unwrap();

        sessions.directory().set_active(admin.id, false).await.unwrap();

        let session = sessions.read_session(&headers_with(&cookie)).await.unwrap();
        assert_eq!(session, None);
    }

    #[tokio::test]
    async fn test_deleted_admin_is_absent() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let cookie = sessions.issue_session(&admin).unwrap();

        sessions.directory().delete(admin.id).await.unwrap();

        assert_eq!(
            sessions.read_session(&headers_with(&cookie)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_role_comes_from_store() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let cookie = sessions.issue_session(&admin).unwrap();

        sessions
            .directory()
            .set_role(admin.id, AdminRole::Manager)
            .await
            .unwrap();

        let session = sessions
            .read_session(&headers_with(&cookie))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.role, AdminRole::Manager);
    }

    #[tokio::test]
    async fn test_expired_token_is_absent() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let now = Utc::now().timestamp();
        let token = sessions
            .cipher
            .seal(&SessionClaims {
                sub: admin.id,
                email: admin.email.clone(),
                role: admin.role,
                iat: now - SESSION_MAX_AGE_SECONDS - 10,
                exp: now - 10,
            })
            .unwrap();
        let cookie = Cookie::new(SESSION_COOKIE_NAME, token);

        assert_eq!(
            sessions.read_session(&headers_with(&cookie)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_foreign_token_is_absent() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);

        let other = SessionManager::new(
            &SecretString::from("Z1@aY2#bX3$cW4%dV5^eU6&fT7*gS8(h"),
            InMemoryDirectory::default(),
            true,
        )
        .unwrap();
        let cookie = other.issue_session(&admin).unwrap();

        assert_eq!(
            sessions.read_session(&headers_with(&cookie)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let sessions = manager();
        let admin = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let cookie = sessions.issue_session(&admin).unwrap();
        sessions.directory().set_offline(true);

        let result = sessions.read_session(&headers_with(&cookie)).await;
        assert!(matches!(result, Err(SessionError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_require_session_role_floor() {
        let sessions = manager();
        let staff = sessions
            .directory()
            .insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let manager_user = sessions
            .directory()
            .insert("manager@lumiere.shop", "hash", AdminRole::Manager);
        let super_admin = sessions
            .directory()
            .insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);

        let floor = Some(AdminRole::Manager);
        let staff_headers = headers_with(&sessions.issue_session(&staff).unwrap());
        assert!(matches!(
            sessions.require_session(&staff_headers, floor).await,
            Err(SessionError::Forbidden)
        ));

        for admin in [&manager_user, &super_admin] {
            let headers = headers_with(&sessions.issue_session(admin).unwrap());
            let session = sessions.require_session(&headers, floor).await.unwrap();
            assert_eq!(session.id, admin.id);
        }
    }

    #[tokio::test]
    async fn test_require_session_without_cookie() {
        let sessions = manager();
        assert!(matches!(
            sessions.require_session(&HeaderMap::new(), None).await,
            Err(SessionError::Unauthenticated)
        ));
    }

    #[test]
    fn test_destroy_session_clears_cookie() {
        let cookie = manager().destroy_session();
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        let header = cookie.to_string();
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Path=/"));
    }

    #[test]
    fn test_require_permission() {
        let session = AdminSession {
            id: lumiere_core::AdminUserId::new(1),
            email: lumiere_core::Email::parse("manager@lumiere.shop").unwrap(),
            role: AdminRole::Manager,
        };
        assert!(require_permission(&session, Permission::ManageOrders).is_ok());
        assert!(matches!(
            require_permission(&session, Permission::ManageUsers),
            Err(SessionError::Forbidden)
        ));
    }
}
