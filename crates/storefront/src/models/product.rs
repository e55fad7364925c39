//! Catalog product as shown to shoppers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lumiere_core::{Money, ProductId, ProductSnapshot};

/// An active catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub category: String,
    pub images: Vec<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The fields a cart or wishlist keeps about this product.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            discount_price: self.discount_price,
            category: self.category.clone(),
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
