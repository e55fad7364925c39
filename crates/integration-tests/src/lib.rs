//! End-to-end tests against running Lumiere servers.
//!
//! # Running Tests
//!
//! ```bash
//! # Bootstrap a super admin for the tests
//! LUMIERE_ADMIN_PASSWORD='...' cargo run -p lumiere-cli -- \
//!     admin create -e ops@lumiere.test -r super_admin
//! lumiere-cli migrate sessions
//!
//! # Start both servers, then
//! LUMIERE_TEST_ADMIN_EMAIL=ops@lumiere.test \
//! LUMIERE_TEST_ADMIN_PASSWORD='...' \
//!     cargo test -p lumiere-integration-tests -- --ignored
//! ```
//!
//! Every test is `#[ignore]`d so the default `cargo test` stays hermetic.

use reqwest::{Client, StatusCode, redirect};

/// Base URL for the admin console (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps cookies and does not follow redirects, so tests can
/// assert on `303 See Other` responses.
///
/// # Errors
///
/// Returns an error if the TLS backend fails to initialize.
pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
}

/// Super admin credentials from `LUMIERE_TEST_ADMIN_EMAIL` and
/// `LUMIERE_TEST_ADMIN_PASSWORD`.
#[must_use]
pub fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("LUMIERE_TEST_ADMIN_EMAIL").ok()?;
    let password = std::env::var("LUMIERE_TEST_ADMIN_PASSWORD").ok()?;
    Some((email, password))
}

/// Post the sign-in form and return the response status.
///
/// A successful sign-in answers `303` with the session cookie, which the
/// client's cookie store keeps for later requests.
///
/// # Errors
///
/// Returns an error if the request cannot be sent.
pub async fn sign_in(client: &Client, email: &str, password: &str) -> reqwest::Result<StatusCode> {
    let response = client
        .post(format!("{}/admin-login", admin_base_url()))
        .form(&[("email", email), ("password", password)])
        .send()
        .await?;
    Ok(response.status())
}
