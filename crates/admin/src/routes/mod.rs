//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /admin-login                  - Sign-in form (redirects if signed in)
//! POST   /admin-login                  - Verify credentials, set session cookie
//! POST   /admin/logout                 - Clear session cookie
//!
//! GET    /admin                        - Dashboard (staff)
//!
//! GET    /admin/orders                 - Orders, optional ?status= (staff)
//! GET    /admin/orders/{id}            - Order with items (staff)
//! POST   /admin/orders/{id}/status     - Update statuses (manage_orders)
//! DELETE /admin/orders/{id}            - Delete order (manage_orders)
//!
//! GET    /admin/products               - Catalog incl. inactive (staff)
//! GET    /admin/products/{id}          - Product (staff)
//! POST   /admin/products               - Create (manage_products)
//! PUT    /admin/products/{id}          - Replace (manage_products)
//! DELETE /admin/products/{id}          - Delete (manage_products)
//!
//! GET    /admin/users                  - Admin accounts (super_admin)
//! POST   /admin/users                  - Create account (super_admin)
//! POST   /admin/users/{id}/role        - Change role (super_admin)
//! POST   /admin/users/{id}/status      - Activate/deactivate (super_admin)
//! POST   /admin/users/{id}/password    - Reset password (super_admin)
//! DELETE /admin/users/{id}             - Delete account (super_admin)
//!
//! GET    /admin/settings               - Site settings (super_admin)
//! PUT    /admin/settings               - Replace site settings (super_admin)
//! ```

mod admin_users;
mod auth;
mod dashboard;
mod orders;
mod products;
mod settings;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .route("/admin", get(dashboard::index))
        // Orders
        .route("/admin/orders", get(orders::index))
        .route(
            "/admin/orders/{id}",
            get(orders::show).delete(orders::delete),
        )
        .route("/admin/orders/{id}/status", post(orders::update_status))
        // Products
        .route(
            "/admin/products",
            get(products::index).post(products::create),
        )
        .route(
            "/admin/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        // Admin users
        .route(
            "/admin/users",
            get(admin_users::index).post(admin_users::create),
        )
        .route("/admin/users/{id}", axum::routing::delete(admin_users::delete))
        .route("/admin/users/{id}/role", post(admin_users::change_role))
        .route("/admin/users/{id}/status", post(admin_users::set_status))
        .route(
            "/admin/users/{id}/password",
            post(admin_users::reset_password),
        )
        // Site settings
        .route(
            "/admin/settings",
            get(settings::show).put(settings::update),
        )
}
