//! Order management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use lumiere_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireManageOrders};
use crate::models::{Order, OrderWithItems};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
}

/// Body of `POST /admin/orders/{id}/status`. At least one field is required.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// GET /admin/orders
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool()).list(query.status).await?;
    Ok(Json(orders))
}

/// GET /admin/orders/{id}
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>, AppError> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// POST /admin/orders/{id}/status
///
/// Any status may move to any other.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn update_status(
    RequireManageOrders(admin): RequireManageOrders,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>, AppError> {
    if update.order_status.is_none() && update.payment_status.is_none() {
        return Err(AppError::BadRequest(
            "order_status or payment_status is required".to_string(),
        ));
    }

    let order = OrderRepository::new(state.pool())
        .update_status(id, update.order_status, update.payment_status)
        .await?;

    tracing::info!(
        order_id = %id,
        order_status = %order.order_status,
        payment_status = %order.payment_status,
        "Order status updated"
    );
    Ok(Json(order))
}

/// DELETE /admin/orders/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireManageOrders(admin): RequireManageOrders,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode, AppError> {
    OrderRepository::new(state.pool()).delete(id).await?;
    tracing::info!(order_id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
