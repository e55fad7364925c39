//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /products               - Active products, optional ?category=
//! GET  /products/{id}          - Product detail
//! GET  /search?q=              - Name/description search
//!
//! GET  /cart                   - Cart with price summary
//! POST /cart/add               - Add product (form: product_id, quantity)
//! POST /cart/update            - Set quantity (form: product_id, quantity)
//! POST /cart/remove            - Remove product (form: product_id)
//! POST /cart/clear             - Empty the cart
//!
//! GET  /wishlist               - Saved products
//! POST /wishlist/toggle        - Save or unsave (form: product_id)
//!
//! GET  /checkout/quote         - Re-priced cart and amount to charge
//! POST /checkout               - Place the order (form: customer details)
//!
//! GET  /orders/{id}            - Confirmation for an order placed in this session
//! ```
//!
//! All responses are JSON. Shopper state comes from the tower-sessions
//! session, so every handler here needs the session layer.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{cart_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .layer(cart_rate_limiter())
        .route("/", get(cart::show))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(wishlist::toggle))
        .layer(cart_rate_limiter())
        .route("/", get(wishlist::show))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order).layer(checkout_rate_limiter()))
        .route("/quote", get(checkout::quote))
}

/// All storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .route("/search", get(search::search))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders/{id}", get(orders::show))
}
