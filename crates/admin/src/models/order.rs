//! Orders as seen from the console.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lumiere_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId};

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

/// A purchased line. `unit_price` is what was charged, independent of the
/// product's current price.
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

/// Dashboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OrderStats {
    pub total_revenue: Money,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub delivered_orders: i64,
}
