//! Order confirmation.

use axum::{
    Json,
    extract::{Path, State},
};
use tower_sessions::Session;
use tracing::instrument;

use lumiere_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::OrderWithItems;
use crate::models::session::placed_order;
use crate::state::AppState;

/// GET /orders/{id}
///
/// Only orders placed from the current session are visible; any other ID
/// answers 404 so order numbers cannot be enumerated.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let not_found = || AppError::NotFound(format!("order {id}"));

    if !placed_order(&session, id).await? {
        return Err(not_found());
    }

    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(order))
}
