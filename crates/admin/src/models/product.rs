//! Catalog product as managed from the console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lumiere_core::{Money, ProductId};

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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductInput {
    /// Check the invariants the pricing calculator relies on.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("category cannot be empty".to_string());
        }
        if self.price.is_negative() {
            return Err("price cannot be negative".to_string());
        }
        if let Some(discount) = self.discount_price {
            if discount.is_negative() {
                return Err("discount price cannot be negative".to_string());
            }
            if discount > self.price {
                return Err("discount price cannot exceed price".to_string());
            }
        }
        if self.stock < 0 {
            return Err("stock cannot be negative".to_string());
        }
        Ok(())
    }
}
