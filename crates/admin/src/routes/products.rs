//! Catalog management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use lumiere_core::ProductId;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireManageProducts};
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// GET /admin/products
///
/// Includes inactive products.
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(ProductRepository::new(state.pool()).list_all().await?))
}

/// GET /admin/products/{id}
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// POST /admin/products
#[instrument(skip(admin, state, input), fields(admin_id = %admin.id))]
pub async fn create(
    RequireManageProducts(admin): RequireManageProducts,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    input.validate().map_err(AppError::BadRequest)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /admin/products/{id}
#[instrument(skip(admin, state, input), fields(admin_id = %admin.id))]
pub async fn update(
    RequireManageProducts(admin): RequireManageProducts,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, AppError> {
    input.validate().map_err(AppError::BadRequest)?;
    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

/// DELETE /admin/products/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireManageProducts(admin): RequireManageProducts,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
