//! Cart pricing.
//!
//! Derives subtotal, shipping, tax, and total from a set of cart lines:
//!
//! - `subtotal` is the sum of each line's effective unit price (the discount
//!   price when present) times its quantity.
//! - `shipping` is zero for an empty cart or a subtotal at or above the free
//!   shipping threshold, otherwise the flat fee.
//! - `tax` is `subtotal × tax_rate`, on the subtotal only, rounded to a whole
//!   minor unit half away from zero.
//! - `total = subtotal + shipping + tax`.
//!
//! The checkout flow charges exactly [`PriceSummary::total`], so the same
//! function runs on the cart page, the quote endpoint, and order creation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// Error returned by [`price_cart`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// A priced line in a cart or an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub unit_price: Money,
    pub discount_unit_price: Option<Money>,
    pub quantity: i32,
}

impl CartLine {
    /// The price actually charged per unit.
    #[must_use]
    pub fn effective_unit_price(&self) -> Money {
        self.discount_unit_price.unwrap_or(self.unit_price)
    }
}

/// Shipping and tax constants.
///
/// Defaults: free shipping from 16600 minor units, 1245 flat fee otherwise,
/// 10% tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_minor(16_600),
            flat_shipping_fee: Money::from_minor(1_245),
            tax_rate: Decimal::new(10, 2),
        }
    }
}

impl PricingPolicy {
    /// Check that every constant is non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidInput`] naming the offending constant.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.free_shipping_threshold.is_negative() {
            return Err(invalid("free shipping threshold is negative"));
        }
        if self.flat_shipping_fee.is_negative() {
            return Err(invalid("flat shipping fee is negative"));
        }
        if self.tax_rate.is_sign_negative() && !self.tax_rate.is_zero() {
            return Err(invalid("tax rate is negative"));
        }
        Ok(())
    }

    /// Remaining amount to reach free shipping, for the "add X more" hint.
    ///
    /// `None` for an empty cart or when shipping is already free.
    #[must_use]
    pub fn amount_until_free_shipping(&self, subtotal: Money) -> Option<Money> {
        if subtotal.minor() <= 0 || subtotal >= self.free_shipping_threshold {
            return None;
        }
        Some(self.free_shipping_threshold.saturating_sub(subtotal))
    }

    fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal >= self.free_shipping_threshold {
            Money::ZERO
        } else {
            self.flat_shipping_fee
        }
    }

    fn tax_for(&self, subtotal: Money) -> Result<Money, PricingError> {
        Decimal::from(subtotal.minor())
            .checked_mul(self.tax_rate)
            .map(|tax| tax.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|tax| tax.to_i64())
            .map(Money::from_minor)
            .ok_or_else(|| invalid("tax overflows"))
    }
}

/// Breakdown of a priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// Price a set of cart lines under `policy`.
///
/// # Errors
///
/// Returns [`PricingError::InvalidInput`] for a quantity below 1, a negative
/// price, an invalid policy, or arithmetic overflow.
pub fn price_cart(lines: &[CartLine], policy: &PricingPolicy) -> Result<PriceSummary, PricingError> {
    policy.validate()?;

    let mut subtotal = Money::ZERO;
    for line in lines {
        if line.quantity < 1 {
            return Err(invalid(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }
        if line.unit_price.is_negative()
            || line.discount_unit_price.is_some_and(Money::is_negative)
        {
            return Err(invalid(format!(
                "price for product {} is negative",
                line.product_id
            )));
        }

        let line_total = line
            .effective_unit_price()
            .checked_mul(i64::from(line.quantity))
            .ok_or_else(|| invalid("line total overflows"))?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| invalid("subtotal overflows"))?;
    }

    let shipping = policy.shipping_for(subtotal);
    let tax = policy.tax_for(subtotal)?;
    let total = subtotal
        .checked_add(shipping)
        .and_then(|t| t.checked_add(tax))
        .ok_or_else(|| invalid("total overflows"))?;

    Ok(PriceSummary {
        subtotal,
        shipping,
        tax,
        total,
    })
}

fn invalid(msg: impl Into<String>) -> PricingError {
    PricingError::InvalidInput(msg.into())
}
