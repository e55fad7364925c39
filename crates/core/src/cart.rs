//! Shopper cart and wishlist.
//!
//! Both are plain values owned by the shopper's session. The storefront
//! loads them from its session store, mutates them, and writes them back;
//! nothing here touches I/O.

use serde::{Deserialize, Serialize};

use crate::pricing::{CartLine, PriceSummary, PricingError, PricingPolicy, price_cart};
use crate::types::{Money, ProductId};

/// The catalog fields a cart or wishlist keeps about a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSnapshot,
    pub quantity: i32,
}

/// A shopper's cart. At most one item per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// Quantities below 1 are treated as 1. The stored snapshot is refreshed
    /// so the cart shows the latest catalog price.
    pub fn add(&mut self, product: ProductSnapshot, quantity: i32) {
        let quantity = quantity.max(1);
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
            item.product = product;
        } else {
            self.items.push(CartItem { product, quantity });
        }
    }

    /// Set the quantity of a product already in the cart, clamped to at
    /// least 1. Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i32) -> bool {
        match self.items.iter_mut().find(|i| i.product.id == product_id) {
            Some(item) => {
                item.quantity = quantity.max(1);
                true
            }
            None => false,
        }
    }

    /// Remove a product. Returns `false` if it was not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .map(|i| CartLine {
                product_id: i.product.id,
                unit_price: i.product.price,
                discount_unit_price: i.product.discount_price,
                quantity: i.quantity,
            })
            .collect()
    }

    /// Price the cart with its stored snapshots.
    ///
    /// # Errors
    ///
    /// Propagates [`PricingError`] from [`price_cart`].
    pub fn price(&self, policy: &PricingPolicy) -> Result<PriceSummary, PricingError> {
        price_cart(&self.lines(), policy)
    }
}

/// Saved products, unique by product ID, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<ProductSnapshot>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[ProductSnapshot] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|p| p.id == product_id)
    }

    /// Returns `false` if the product was already saved.
    pub fn add(&mut self, product: ProductSnapshot) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.items.push(product);
        true
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != product_id);
        self.items.len() != before
    }

    /// Add the product if absent, remove it if present. Returns whether the
    /// product is saved afterwards.
    pub fn toggle(&mut self, product: ProductSnapshot) -> bool {
        if self.remove(product.id) {
            false
        } else {
            self.items.push(product);
            true
        }
    }
}
