//! Sign-in and sign-out.

use axum::{
    Form, Json, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::auth::{HOME_PATH, LOGIN_PATH};
use crate::middleware::{OptionalAdmin, login_rate_limiter};
use crate::services::verify_credentials;
use crate::state::AppState;

/// Sign-in form fields.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Build the auth router.
///
/// Only `POST /admin-login` is rate limited.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            LOGIN_PATH,
            get(login_page).merge(post(login).layer(login_rate_limiter())),
        )
        .route("/admin/logout", post(logout))
}

/// GET /admin-login
///
/// Signed-in admins go straight to the dashboard.
async fn login_page(OptionalAdmin(admin): OptionalAdmin) -> Response {
    if admin.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }
    Json(json!({
        "action": LOGIN_PATH,
        "fields": ["email", "password"],
    }))
    .into_response()
}

/// POST /admin-login
#[instrument(skip(state, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let sessions = state.sessions();
    let admin = verify_credentials(sessions.directory(), &form.email, &form.password).await?;
    let cookie = sessions.issue_session(&admin)?;

    tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin signed in");
    Ok(([(SET_COOKIE, cookie.to_string())], Redirect::to(HOME_PATH)).into_response())
}

/// POST /admin/logout
///
/// Always clears the cookie, signed in or not.
async fn logout(State(state): State<AppState>) -> Response {
    let cookie = state.sessions().destroy_session();
    ([(SET_COOKIE, cookie.to_string())], Redirect::to(LOGIN_PATH)).into_response()
}
