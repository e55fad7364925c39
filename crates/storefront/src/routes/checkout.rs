//! Checkout route handlers.
//!
//! The front end asks for a quote, hands `amount_minor` to the payment
//! gateway, and posts the gateway's payment reference with the customer
//! details. The order is priced again at that point, so a catalog change
//! between quote and payment is charged at the new price.

use axum::{Form, Json, extract::State, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use lumiere_core::{CurrencyCode, PriceSummary};

use crate::error::{Result, add_breadcrumb};
use crate::models::session::{load_cart, remember_order, save_cart};
use crate::models::{CheckoutDetails, OrderLine, OrderWithItems};
use crate::services::checkout;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub lines: Vec<OrderLine>,
    pub summary: PriceSummary,
    /// Amount for the payment gateway, in minor units.
    pub amount_minor: i64,
    pub currency: CurrencyCode,
    pub display_total: String,
}

/// GET /checkout/quote
#[instrument(skip(state, session))]
pub async fn quote(State(state): State<AppState>, session: Session) -> Result<Json<QuoteView>> {
    let cart = load_cart(&session).await?;
    let quote = checkout::quote(state.pool(), &cart, state.pricing()).await?;

    Ok(Json(QuoteView {
        amount_minor: quote.amount_minor(),
        display_total: quote.summary.total.display(state.currency()),
        currency: state.currency(),
        summary: quote.summary,
        lines: quote.lines,
    }))
}

/// POST /checkout
///
/// On success the cart is emptied and the order is remembered in the
/// session so `/orders/{id}` will show it.
#[instrument(skip(state, session, details))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Form(details): Form<CheckoutDetails>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let mut cart = load_cart(&session).await?;
    let order = checkout::place_order(state.pool(), &cart, &details, state.pricing()).await?;

    cart.clear();
    save_cart(&session, &cart).await?;
    remember_order(&session, order.order.id).await?;

    let order_id = order.order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok((StatusCode::CREATED, Json(order)))
}
