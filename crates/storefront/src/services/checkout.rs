//! Checkout: re-price the cart against the live catalog and place orders.
//!
//! The cart's snapshots are only used to find product IDs and quantities.
//! Prices, names, availability, and stock always come from the catalog at
//! the moment of checkout. The amount the gateway captured must equal the
//! re-priced [`PriceSummary::total`]; if the catalog changed since the quote
//! the order is refused and nothing is written.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use lumiere_core::{Cart, CartLine, PriceSummary, PricingError, PricingPolicy, price_cart};

use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{CheckoutDetails, OrderLine, OrderWithItems, Product};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("{0} is no longer available")]
    ProductUnavailable(String),

    #[error("only {available} of {product} left in stock")]
    InsufficientStock { product: String, available: i32 },

    /// Stock ran out between the quote and the write.
    #[error("{0}")]
    StockChanged(String),

    /// The captured amount no longer matches the catalog price.
    #[error("amount charged ({charged}) does not match the order total ({total})")]
    AmountMismatch { charged: i64, total: i64 },

    #[error("invalid checkout details: {0}")]
    InvalidDetails(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A priced cart ready to be charged.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub lines: Vec<OrderLine>,
    pub summary: PriceSummary,
}

impl Quote {
    /// Amount to hand to the payment gateway, in minor units.
    #[must_use]
    pub const fn amount_minor(&self) -> i64 {
        self.summary.total.minor()
    }
}

/// Price `cart` with the products in `catalog`.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] if the cart has no items
/// - [`CheckoutError::ProductUnavailable`] if a product is missing from the
///   catalog (deleted or deactivated)
/// - [`CheckoutError::InsufficientStock`] if a quantity exceeds stock
/// - [`CheckoutError::Pricing`] if the calculator rejects the lines
pub fn build_quote(
    cart: &Cart,
    catalog: &[Product],
    policy: &PricingPolicy,
) -> Result<Quote, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.items().len());
    let mut priced = Vec::with_capacity(cart.items().len());

    for item in cart.items() {
        let product = catalog
            .iter()
            .find(|p| p.id == item.product.id)
            .ok_or_else(|| CheckoutError::ProductUnavailable(item.product.name.clone()))?;

        if item.quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
            });
        }

        let line = CartLine {
            product_id: product.id,
            unit_price: product.price,
            discount_unit_price: product.discount_price,
            quantity: item.quantity,
        };
        lines.push(OrderLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            unit_price: line.effective_unit_price(),
        });
        priced.push(line);
    }

    let summary = price_cart(&priced, policy)?;
    Ok(Quote { lines, summary })
}

/// Check that the gateway captured exactly the quoted total.
///
/// # Errors
///
/// Returns [`CheckoutError::AmountMismatch`] if `charged` differs.
pub const fn confirm_charge(quote: &Quote, charged: i64) -> Result<(), CheckoutError> {
    let total = quote.amount_minor();
    if charged == total {
        Ok(())
    } else {
        Err(CheckoutError::AmountMismatch { charged, total })
    }
}

/// Load the cart's products and price it.
///
/// # Errors
///
/// See [`build_quote`]; also [`CheckoutError::Repository`] if the catalog
/// cannot be read.
pub async fn quote(
    pool: &PgPool,
    cart: &Cart,
    policy: &PricingPolicy,
) -> Result<Quote, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let ids: Vec<_> = cart.items().iter().map(|i| i.product.id).collect();
    let catalog = ProductRepository::new(pool).get_active_many(&ids).await?;
    build_quote(cart, &catalog, policy)
}

/// Re-price the cart and persist the order with its charged prices.
///
/// # Errors
///
/// See [`quote`]; also [`CheckoutError::InvalidDetails`] for a bad form,
/// [`CheckoutError::AmountMismatch`] if the captured amount is not the
/// current total, and [`CheckoutError::StockChanged`] if stock ran out
/// between the quote and the write.
#[instrument(skip(pool, cart, details, policy), fields(items = cart.items().len()))]
pub async fn place_order(
    pool: &PgPool,
    cart: &Cart,
    details: &CheckoutDetails,
    policy: &PricingPolicy,
) -> Result<OrderWithItems, CheckoutError> {
    let details = details
        .normalized()
        .map_err(CheckoutError::InvalidDetails)?;
    let quote = quote(pool, cart, policy).await?;
    if let Err(e) = confirm_charge(&quote, details.amount_minor) {
        tracing::warn!(
            charged = details.amount_minor,
            total = quote.amount_minor(),
            payment_reference = %details.payment_reference,
            "Captured amount does not match order total"
        );
        return Err(e);
    }

    let order = OrderRepository::new(pool)
        .create(&details, &quote.summary, &quote.lines)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => CheckoutError::StockChanged(msg),
            other => CheckoutError::Repository(other),
        })?;

    tracing::info!(
        order_id = %order.order.id,
        total_minor = order.order.total_amount.minor(),
        "Order placed"
    );
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lumiere_core::{Money, ProductId};

    use super::*;
    use crate::models::product::fixtures::product;

    fn cart_with(products: &[(&Product, i32)]) -> Cart {
        let mut cart = Cart::new();
        for (p, qty) in products {
            cart.add(p.snapshot(), *qty);
        }
        cart
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let result = build_quote(&Cart::new(), &[], &PricingPolicy::default());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_quote_uses_current_catalog_prices() {
        let stale = product(1, 1000, 10);
        let cart = cart_with(&[(&stale, 2)]);

        let mut current = product(1, 1500, 10);
        current.discount_price = Some(Money::from_minor(1200));

        let quote = build_quote(&cart, &[current], &PricingPolicy::default()).unwrap();
        assert_eq!(quote.summary.subtotal, Money::from_minor(2400));
        assert_eq!(quote.lines[0].unit_price, Money::from_minor(1200));
        assert_eq!(quote.lines[0].quantity, 2);
    }

    #[test]
    fn test_quote_matches_calculator() {
        let a = product(1, 9000, 5);
        let b = product(2, 8000, 5);
        let cart = cart_with(&[(&a, 1), (&b, 1)]);
        let policy = PricingPolicy::default();

        let quote = build_quote(&cart, &[a, b], &policy).unwrap();
        assert_eq!(quote.summary, cart.price(&policy).unwrap());
        // 17000 is over the free shipping threshold; 10% tax.
        assert_eq!(quote.summary.shipping, Money::ZERO);
        assert_eq!(quote.summary.tax, Money::from_minor(1700));
        assert_eq!(quote.amount_minor(), 18_700);
    }

    #[test]
    fn test_missing_product_is_unavailable() {
        let gone = product(9, 500, 3);
        let cart = cart_with(&[(&gone, 1)]);

        let result = build_quote(&cart, &[product(1, 500, 3)], &PricingPolicy::default());
        assert!(matches!(
            result,
            Err(CheckoutError::ProductUnavailable(name)) if name == "Candle 9"
        ));
    }

    #[test]
    fn test_quantity_over_stock_is_rejected() {
        let p = product(4, 700, 2);
        let cart = cart_with(&[(&p, 3)]);

        let result = build_quote(&cart, &[p], &PricingPolicy::default());
        assert!(matches!(
            result,
            Err(CheckoutError::InsufficientStock { available: 2, .. })
        ));
    }

    #[test]
    fn test_charge_must_match_current_total() {
        let p = product(1, 5000, 5);
        let cart = cart_with(&[(&p, 1)]);
        let policy = PricingPolicy::default();

        let quoted = build_quote(&cart, &[p], &policy).unwrap();
        let charged = quoted.amount_minor();
        assert_eq!(charged, 6745);
        assert!(confirm_charge(&quoted, charged).is_ok());

        // Price rises between the quote and the submit
        let repriced = build_quote(&cart, &[product(1, 6000, 5)], &policy).unwrap();
        assert_eq!(repriced.amount_minor(), 7845);
        assert!(matches!(
            confirm_charge(&repriced, charged),
            Err(CheckoutError::AmountMismatch {
                charged: 6745,
                total: 7845
            })
        ));
    }

    #[test]
    fn test_lines_keep_cart_order() {
        let a = product(1, 100, 5);
        let b = product(2, 200, 5);
        let cart = cart_with(&[(&b, 1), (&a, 1)]);

        let quote = build_quote(&cart, &[a, b], &PricingPolicy::default()).unwrap();
        let ids: Vec<_> = quote.lines.iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![ProductId::new(2), ProductId::new(1)]);
    }
}
