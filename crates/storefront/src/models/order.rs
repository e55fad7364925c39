//! Orders placed by shoppers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lumiere_core::{Email, Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total_amount: Money,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// A line about to be written as an order item. `unit_price` is the
/// effective price charged at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

/// Customer fields submitted with the checkout form.
#[derive(Clone, Deserialize)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    /// Reference returned by the payment gateway for the captured charge.
    pub payment_reference: String,
    /// Amount the gateway captured, in minor units. Must equal the quote.
    pub amount_minor: i64,
}

impl std::fmt::Debug for CheckoutDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutDetails")
            .field("customer_name", &"[REDACTED]")
            .field("customer_email", &"[REDACTED]")
            .field("customer_phone", &"[REDACTED]")
            .field("shipping_address", &"[REDACTED]")
            .field("payment_reference", &self.payment_reference)
            .field("amount_minor", &self.amount_minor)
            .finish()
    }
}

impl CheckoutDetails {
    /// Trim every field and check that the order can be fulfilled.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first missing or malformed
    /// field.
    pub fn normalized(&self) -> Result<Self, String> {
        let required = |value: &str, field: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(format!("{field} is required"))
            } else {
                Ok(value.to_string())
            }
        };

        let customer_name = required(&self.customer_name, "customer_name")?;
        let customer_email = Email::parse(&self.customer_email)
            .map_err(|e| e.to_string())?
            .into_inner();
        let customer_phone = required(&self.customer_phone, "customer_phone")?;
        let shipping_address = required(&self.shipping_address, "shipping_address")?;
        let payment_reference = required(&self.payment_reference, "payment_reference")?;
        if self.amount_minor <= 0 {
            return Err("amount_minor must be positive".to_string());
        }

        Ok(Self {
            customer_name,
            customer_email,
            customer_phone,
            shipping_address,
            payment_reference,
            amount_minor: self.amount_minor,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details() -> CheckoutDetails {
        CheckoutDetails {
            customer_name: "  Ada Lovelace ".to_string(),
            customer_email: "ada@example.com".to_string(),
            customer_phone: "+44 20 7946 0958".to_string(),
            shipping_address: "12 Analytical Row, London".to_string(),
            payment_reference: "pay_Q1w2E3r4".to_string(),
            amount_minor: 6745,
        }
    }

    #[test]
    fn test_normalized_trims() {
        let normalized = details().normalized().unwrap();
        assert_eq!(normalized.customer_name, "Ada Lovelace");
        assert_eq!(normalized.customer_email, "ada@example.com");
    }

    #[test]
    fn test_normalized_rejects_missing_fields() {
        let mut d = details();
        d.shipping_address = "   ".to_string();
        assert_eq!(d.normalized().unwrap_err(), "shipping_address is required");

        let mut d = details();
        d.payment_reference = String::new();
        assert!(d.normalized().is_err());

        let mut d = details();
        d.customer_email = "not-an-email".to_string();
        assert!(d.normalized().is_err());

        let mut d = details();
        d.amount_minor = 0;
        assert_eq!(d.normalized().unwrap_err(), "amount_minor must be positive");
    }

    #[test]
    fn test_debug_redacts_customer_fields() {
        let debug = format!("{:?}", details());
        assert!(!debug.contains("Lovelace"));
        assert!(!debug.contains("ada@example.com"));
        assert!(debug.contains("pay_Q1w2E3r4"));
    }
}
