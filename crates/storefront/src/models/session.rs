//! Shopper state kept in the tower-sessions session.
//!
//! The cart and wishlist are stored as whole values under fixed keys and
//! written back after every change. Orders placed from the session are
//! remembered so their confirmation page stays private to the shopper.

use tower_sessions::Session;
use tower_sessions::session::Error;

use lumiere_core::{Cart, OrderId, Wishlist};

/// Session keys.
pub mod keys {
    pub const CART: &str = "cart";
    pub const WISHLIST: &str = "wishlist";
    /// Order IDs placed during this session, oldest first.
    pub const PLACED_ORDERS: &str = "placed_orders";
}

/// Confirmations older than this many orders are forgotten.
const MAX_REMEMBERED_ORDERS: usize = 20;

/// # Errors
///
/// Returns the store error if the session cannot be loaded or decoded.
pub async fn load_cart(session: &Session) -> Result<Cart, Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// # Errors
///
/// Returns the store error if the session cannot be written.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), Error> {
    session.insert(keys::CART, cart).await
}

/// # Errors
///
/// Returns the store error if the session cannot be loaded or decoded.
pub async fn load_wishlist(session: &Session) -> Result<Wishlist, Error> {
    Ok(session
        .get::<Wishlist>(keys::WISHLIST)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns the store error if the session cannot be written.
pub async fn save_wishlist(session: &Session, wishlist: &Wishlist) -> Result<(), Error> {
    session.insert(keys::WISHLIST, wishlist).await
}

/// Record an order placed from this session.
///
/// # Errors
///
/// Returns the store error if the session cannot be read or written.
pub async fn remember_order(session: &Session, id: OrderId) -> Result<(), Error> {
    let mut placed = placed_orders(session).await?;
    placed.push(id);
    if placed.len() > MAX_REMEMBERED_ORDERS {
        let excess = placed.len() - MAX_REMEMBERED_ORDERS;
        placed.drain(..excess);
    }
    session.insert(keys::PLACED_ORDERS, placed).await
}

/// Whether `id` was placed from this session.
///
/// # Errors
///
/// Returns the store error if the session cannot be loaded or decoded.
pub async fn placed_order(session: &Session, id: OrderId) -> Result<bool, Error> {
    Ok(placed_orders(session).await?.contains(&id))
}

async fn placed_orders(session: &Session) -> Result<Vec<OrderId>, Error> {
    Ok(session
        .get::<Vec<OrderId>>(keys::PLACED_ORDERS)
        .await?
        .unwrap_or_default())
}
