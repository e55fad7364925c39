//! Order persistence for checkout and confirmation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lumiere_core::{
    Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, PriceSummary, ProductId,
};

use super::RepositoryError;
use crate::models::order::{CheckoutDetails, Order, OrderItem, OrderLine, OrderWithItems};

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, \
    shipping_address, subtotal, shipping, tax, total_amount, payment_status, \
    order_status, payment_reference, created_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, unit_price";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    shipping_address: String,
    subtotal: i64,
    shipping: i64,
    tax: i64,
    total_amount: i64,
    payment_status: String,
    order_status: String,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row.id),
            payment_status: row
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?,
            order_status: row
                .order_status
                .parse::<OrderStatus>()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            shipping_address: row.shipping_address,
            subtotal: Money::from_minor(row.subtotal),
            shipping: Money::from_minor(row.shipping),
            tax: Money::from_minor(row.tax),
            total_amount: Money::from_minor(row.total_amount),
            payment_reference: row.payment_reference,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    quantity: i32,
    unit_price: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: Money::from_minor(row.unit_price),
        }
    }
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a paid order in one transaction: decrement stock for every
    /// line, insert the order, then its items.
    ///
    /// Stock is only taken when enough remains and the product is still
    /// active, so two concurrent checkouts cannot oversell. Nothing is
    /// written if any line fails.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the product whose stock ran
    /// out, or `RepositoryError::Database` if a statement fails.
    pub async fn create(
        &self,
        details: &CheckoutDetails,
        summary: &PriceSummary,
        lines: &[OrderLine],
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for line in lines {
            let taken = sqlx::query(
                "UPDATE products SET stock = stock - $2 \
                 WHERE id = $1 AND is_active AND stock >= $2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if taken.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "not enough stock for {}",
                    line.product_name
                )));
            }
        }

        let order: Order = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders \
                (customer_name, customer_email, customer_phone, shipping_address, \
                 subtotal, shipping, tax, total_amount, payment_status, order_status, \
                 payment_reference) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&details.customer_name)
        .bind(&details.customer_email)
        .bind(&details.customer_phone)
        .bind(&details.shipping_address)
        .bind(summary.subtotal.minor())
        .bind(summary.shipping.minor())
        .bind(summary.tax.minor())
        .bind(summary.total.minor())
        .bind(PaymentStatus::Completed.as_str())
        .bind(OrderStatus::Pending.as_str())
        .bind(&details.payment_reference)
        .fetch_one(&mut *tx)
        .await?
        .try_into()?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, OrderItemRow>(&format!(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {ORDER_ITEM_COLUMNS}"
            ))
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price.minor())
            .fetch_one(&mut *tx)
            .await?;
            items.push(row.into());
        }

        tx.commit().await?;

        Ok(OrderWithItems { order, items })
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order: row.try_into()?,
            items: items.into_iter().map(Into::into).collect(),
        }))
    }
}
