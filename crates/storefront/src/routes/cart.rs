//! Cart route handlers.
//!
//! The cart lives in the shopper's session. Each write loads it, applies one
//! change, saves it back, and answers with the re-priced cart.

use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use lumiere_core::{Cart, CurrencyCode, Money, PriceSummary, PricingPolicy, ProductId, ProductSnapshot};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::session::{load_cart, save_cart};
use crate::services::CheckoutError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product: ProductSnapshot,
    pub quantity: i32,
    pub line_total: Money,
    pub display_line_total: String,
}

/// Cart with its price breakdown, priced from the stored snapshots.
///
/// Checkout re-prices against the live catalog; see
/// [`crate::services::checkout`].
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: i64,
    pub summary: PriceSummary,
    pub display_total: String,
    /// How much more to spend for free shipping; absent once it applies.
    pub free_shipping_remaining: Option<Money>,
    pub currency: CurrencyCode,
}

impl CartView {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the calculator rejects the cart.
    pub fn build(cart: &Cart, policy: &PricingPolicy, currency: CurrencyCode) -> Result<Self> {
        let summary = cart.price(policy).map_err(CheckoutError::from)?;

        let items = cart
            .items()
            .iter()
            .zip(cart.lines())
            .map(|(item, line)| {
                // Already checked by the calculator above
                let line_total = line
                    .effective_unit_price()
                    .checked_mul(i64::from(line.quantity))
                    .unwrap_or(Money::ZERO);
                CartItemView {
                    product: item.product.clone(),
                    quantity: item.quantity,
                    line_total,
                    display_line_total: line_total.display(currency),
                }
            })
            .collect();

        Ok(Self {
            items,
            item_count: cart.item_count(),
            display_total: summary.total.display(currency),
            free_shipping_remaining: policy.amount_until_free_shipping(summary.subtotal),
            summary,
            currency,
        })
    }
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

fn view(state: &AppState, cart: &Cart) -> Result<Json<CartView>> {
    Ok(Json(CartView::build(cart, state.pricing(), state.currency())?))
}

/// GET /cart
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    view(&state, &cart)
}

/// POST /cart/add
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get_active(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    if !product.in_stock() {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    let mut cart = load_cart(&session).await?;
    cart.add(product.snapshot(), form.quantity);
    save_cart(&session, &cart).await?;

    tracing::info!(product_id = %product.id, "Added to cart");
    view(&state, &cart)
}

/// POST /cart/update
///
/// Quantities below 1 are clamped to 1; use `/cart/remove` to drop a line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if !cart.set_quantity(form.product_id, form.quantity) {
        return Err(AppError::NotFound(format!(
            "product {} is not in the cart",
            form.product_id
        )));
    }
    save_cart(&session, &cart).await?;
    view(&state, &cart)
}

/// POST /cart/remove
///
/// Removing a product that is not in the cart is a no-op.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(form.product_id) {
        save_cart(&session, &cart).await?;
    }
    view(&state, &cart)
}

/// POST /cart/clear
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = Cart::new();
    save_cart(&session, &cart).await?;
    view(&state, &cart)
}
