//! Order repository for the console.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lumiere_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, OrderStats, OrderWithItems};

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, \
    shipping_address, subtotal, shipping, tax, total_amount, payment_status, \
    order_status, payment_reference, created_at";

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
        let payment_status = row
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let order_status = row
            .order_status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: OrderId::new(row.id),
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            shipping_address: row.shipping_address,
            subtotal: Money::from_minor(row.subtotal),
            shipping: Money::from_minor(row.shipping),
            tax: Money::from_minor(row.tax),
            total_amount: Money::from_minor(row.total_amount),
            payment_status,
            order_status,
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

#[derive(Debug, sqlx::FromRow)]
struct OrderStatsRow {
    total_revenue: i64,
    total_orders: i64,
    pending_orders: i64,
    delivered_orders: i64,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a status is unknown.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::TEXT IS NULL OR order_status = $1) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status.map(OrderStatus::as_str))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
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

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order: row.try_into()?,
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    /// Update the order and/or payment status. `None` leaves a field as is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    pub async fn update_status(
        &self,
        id: OrderId,
        order_status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET \
                order_status = COALESCE($2, order_status), \
                payment_status = COALESCE($3, payment_status) \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(order_status.map(OrderStatus::as_str))
        .bind(payment_status.map(PaymentStatus::as_str))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Revenue and order counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let row = sqlx::query_as::<_, OrderStatsRow>(
            "SELECT \
                COALESCE(SUM(total_amount), 0)::BIGINT AS total_revenue, \
                COUNT(*) AS total_orders, \
                COUNT(*) FILTER (WHERE order_status = 'pending') AS pending_orders, \
                COUNT(*) FILTER (WHERE order_status = 'delivered') AS delivered_orders \
             FROM orders",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(OrderStats {
            total_revenue: Money::from_minor(row.total_revenue),
            total_orders: row.total_orders,
            pending_orders: row.pending_orders,
            delivered_orders: row.delivered_orders,
        })
    }
}
