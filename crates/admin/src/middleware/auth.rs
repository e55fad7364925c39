//! Authentication extractors for admin routes.
//!
//! Each extractor resolves the session cookie through the
//! [`SessionManager`] and applies one [`Gate`]. Rejections become redirects
//! for browser requests and status codes for API requests:
//!
//! | outcome | browser | API (`/api/` or `Accept: application/json`) |
//! |---------|---------|------|
//! | no valid session | redirect `/admin-login`, cookie cleared | `401`, cookie cleared |
//! | insufficient role | redirect `/admin` | `403` |
//! | identity store down | `503` | `503` |

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{
        HeaderMap, StatusCode,
        header::{ACCEPT, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::cookie::Cookie;

use lumiere_core::{AdminRole, Permission};

use crate::error::set_sentry_user;
use crate::models::AdminSession;
use crate::services::session::{
    AdminDirectory, SessionError, SessionManager, require_permission,
};
use crate::state::AppState;

/// Where unauthenticated browsers are sent.
pub const LOGIN_PATH: &str = "/admin-login";

/// Where under-privileged browsers are sent.
pub const HOME_PATH: &str = "/admin";

/// The check an extractor applies once a session is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Minimum role in the hierarchy.
    Role(AdminRole),
    /// Capability from the role's permission set.
    Permission(Permission),
}

/// Why a gated request was refused.
#[derive(Debug)]
pub enum AuthRejection {
    Unauthenticated {
        wants_json: bool,
        clear_cookie: Cookie<'static>,
    },
    Forbidden {
        wants_json: bool,
    },
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated {
                wants_json,
                clear_cookie,
            } => {
                let cookie = [(SET_COOKIE, clear_cookie.to_string())];
                if wants_json {
                    (
                        StatusCode::UNAUTHORIZED,
                        cookie,
                        Json(json!({ "error": "not authenticated" })),
                    )
                        .into_response()
                } else {
                    (cookie, Redirect::to(LOGIN_PATH)).into_response()
                }
            }
            Self::Forbidden { wants_json: true } => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "forbidden" })),
            )
                .into_response(),
            Self::Forbidden { wants_json: false } => Redirect::to(HOME_PATH).into_response(),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            )
                .into_response(),
        }
    }
}

/// Whether the caller expects JSON rather than a page.
fn wants_json(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/") || accepts_json(&parts.headers)
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

/// Resolve the session on `parts` and apply `gate`.
///
/// # Errors
///
/// Returns the `AuthRejection` matching the failure.
pub async fn authorize<D: AdminDirectory>(
    sessions: &SessionManager<D>,
    parts: &Parts,
    gate: Gate,
) -> Result<AdminSession, AuthRejection> {
    let minimum = match gate {
        Gate::Role(role) => Some(role),
        Gate::Permission(_) => None,
    };

    let session = sessions
        .require_session(&parts.headers, minimum)
        .await
        .and_then(|session| match gate {
            Gate::Permission(permission) => {
                require_permission(&session, permission).map(|()| session)
            }
            Gate::Role(_) => Ok(session),
        });

    match session {
        Ok(session) => Ok(session),
        Err(SessionError::Unauthenticated) => Err(AuthRejection::Unauthenticated {
            wants_json: wants_json(parts),
            clear_cookie: sessions.destroy_session(),
        }),
        Err(SessionError::Forbidden) => {
            tracing::info!(path = %parts.uri.path(), ?gate, "Admin request forbidden");
            Err(AuthRejection::Forbidden {
                wants_json: wants_json(parts),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Session check failed");
            Err(AuthRejection::Unavailable)
        }
    }
}

macro_rules! gated_extractor {
    ($(#[$meta:meta])* $name:ident, $gate:expr) => {
        $(#[$meta])*
        pub struct $name(pub AdminSession);

        impl<S> FromRequestParts<S> for $name
        where
            AppState: FromRef<S>,
            S: Send + Sync,
        {
            type Rejection = AuthRejection;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let state = AppState::from_ref(state);
                let session = authorize(state.sessions(), parts, $gate).await?;
                set_sentry_user(session.id.as_i32(), session.email.as_str());
                Ok(Self(session))
            }
        }
    };
}

gated_extractor!(
    /// Any active admin (staff floor).
    RequireAdmin,
    Gate::Role(AdminRole::Staff)
);

gated_extractor!(
    /// Admins who can change orders.
    RequireManageOrders,
    Gate::Permission(Permission::ManageOrders)
);

gated_extractor!(
    /// Admins who can change the catalog.
    RequireManageProducts,
    Gate::Permission(Permission::ManageProducts)
);

gated_extractor!(
    /// Super admins only.
    RequireSuperAdmin,
    Gate::Role(AdminRole::SuperAdmin)
);

/// The current admin, if any. Never rejects.
///
/// An identity store failure is logged and treated as signed out.
pub struct OptionalAdmin(pub Option<AdminSession>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let session = match state.sessions().read_session(&parts.headers).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                None
            }
        };
        Ok(Self(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderValue, Request, header::COOKIE, header::LOCATION};
    use secrecy::SecretString;

    use super::*;
    use crate::models::AdminUser;
    use crate::services::session::SESSION_COOKIE_NAME;
    use crate::services::session::memory::InMemoryDirectory;

    fn sessions() -> SessionManager<InMemoryDirectory> {
        SessionManager::new(
            &SecretString::from("k7#Qm2!zR9$wX4@pL6^tN8&vB3*yH5%d"),
            InMemoryDirectory::default(),
            false,
        )
        .unwrap()
    }

    fn parts(path: &str, accept: Option<&str>, cookie: Option<&Cookie<'_>>) -> Parts {
        let mut builder = Request::builder().uri(path);
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(cookie) = cookie {
            builder = builder.header(
                COOKIE,
                HeaderValue::from_str(&format!("{}={}", cookie.name(), cookie.value())).unwrap(),
            );
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn login(sessions: &SessionManager<InMemoryDirectory>, role: AdminRole) -> (AdminUser, Cookie<'static>) {
        let email = format!("{}@lumiere.shop", role.as_str());
        let admin = sessions.directory().insert(&email, "hash", role);
        let cookie = sessions.issue_session(&admin).unwrap();
        (admin, cookie)
    }

    #[tokio::test]
    async fn test_unauthenticated_browser_redirects_to_login() {
        let sessions = sessions();
        let rejection = authorize(
            &sessions,
            &parts("/admin/orders", None, None),
            Gate::Role(AdminRole::Staff),
        )
        .await
        .unwrap_err();

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], LOGIN_PATH);
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with(SESSION_COOKIE_NAME));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_unauthenticated_api_gets_401() {
        let sessions = sessions();
        let response = authorize(
            &sessions,
            &parts("/admin/orders", Some("application/json"), None),
            Gate::Role(AdminRole::Staff),
        )
        .await
        .unwrap_err()
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(SET_COOKIE));

        let response = authorize(
            &sessions,
            &parts("/api/ping", None, None),
            Gate::Role(AdminRole::Staff),
        )
        .await
        .unwrap_err()
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_staff_forbidden_on_manager_floor() {
        let sessions = sessions();
        let (_, cookie) = login(&sessions, AdminRole::Staff);

        let response = authorize(
            &sessions,
            &parts("/admin/products", None, Some(&cookie)),
            Gate::Role(AdminRole::Manager),
        )
        .await
        .unwrap_err()
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], HOME_PATH);
        assert!(!response.headers().contains_key(SET_COOKIE));
    }

    #[tokio::test]
    async fn test_permission_gate() {
        let sessions = sessions();
        let (_, staff) = login(&sessions, AdminRole::Staff);
        let (manager, manager_cookie) = login(&sessions, AdminRole::Manager);

        let gate = Gate::Permission(Permission::ManageOrders);
        let rejection = authorize(
            &sessions,
            &parts("/admin/orders/1/status", Some("application/json"), Some(&staff)),
            gate,
        )
        .await
        .unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);

        let session = authorize(
            &sessions,
            &parts("/admin/orders/1/status", None, Some(&manager_cookie)),
            gate,
        )
        .await
        .unwrap();
        assert_eq!(session.id, manager.id);

        assert!(
            authorize(
                &sessions,
                &parts("/admin/users", None, Some(&manager_cookie)),
                Gate::Permission(Permission::ManageUsers),
            )
            .await
            .is_err()
        );
    }

    #[tokio::test]
    async fn test_super_admin_passes_every_gate() {
        let sessions = sessions();
        let (owner, cookie) = login(&sessions, AdminRole::SuperAdmin);
        let request = parts("/admin/users", None, Some(&cookie));

        for role in AdminRole::ALL {
            let session = authorize(&sessions, &request, Gate::Role(role)).await.unwrap();
            assert_eq!(session.id, owner.id);
        }
        for permission in Permission::ALL {
            assert!(
                authorize(&sessions, &request, Gate::Permission(permission))
                    .await
                    .is_ok()
            );
        }
    }

    #[tokio::test]
    async fn test_settings_are_super_admin_only() {
        let sessions = sessions();
        let (_, cookie) = login(&sessions, AdminRole::Manager);

        let rejection = authorize(
            &sessions,
            &parts("/admin/settings", Some("application/json"), Some(&cookie)),
            Gate::Role(AdminRole::SuperAdmin),
        )
        .await
        .unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_store_outage_is_503() {
        let sessions = sessions();
        let (_, cookie) = login(&sessions, AdminRole::Manager);
        sessions.directory().set_offline(true);

        let response = authorize(
            &sessions,
            &parts("/admin", None, Some(&cookie)),
            Gate::Role(AdminRole::Staff),
        )
        .await
        .unwrap_err()
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
