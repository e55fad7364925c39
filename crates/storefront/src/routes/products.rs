//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header::CACHE_CONTROL,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumiere_core::{CurrencyCode, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Catalog pages carry no shopper data and may be cached briefly.
const CATALOG_CACHE_CONTROL: &str = "public, max-age=60";

/// A product with its prices formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub display_price: String,
    pub display_discount_price: Option<String>,
    pub in_stock: bool,
}

impl ProductView {
    #[must_use]
    pub fn new(product: Product, currency: CurrencyCode) -> Self {
        Self {
            display_price: product.price.display(currency),
            display_discount_price: product.discount_price.map(|p| p.display(currency)),
            in_stock: product.in_stock(),
            product,
        }
    }
}

pub(crate) fn views(products: Vec<Product>, currency: CurrencyCode) -> Vec<ProductView> {
    products
        .into_iter()
        .map(|p| ProductView::new(p, currency))
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
}

/// GET /products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse> {
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let products = ProductRepository::new(state.pool())
        .list_active(category)
        .await?;

    Ok((
        [(CACHE_CONTROL, CATALOG_CACHE_CONTROL)],
        Json(views(products, state.currency())),
    ))
}

/// GET /products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_active(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok((
        [(CACHE_CONTROL, CATALOG_CACHE_CONTROL)],
        Json(ProductView::new(product, state.currency())),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lumiere_core::Money;

    use super::*;
    use crate::models::product::fixtures::product;

    #[test]
    fn test_view_formats_prices() {
        let mut p = product(1, 6745, 0);
        p.discount_price = Some(Money::from_minor(5000));

        let view = ProductView::new(p, CurrencyCode::INR);
        assert_eq!(view.display_price, "₹67.45");
        assert_eq!(view.display_discount_price.as_deref(), Some("₹50.00"));
        assert!(!view.in_stock);
    }

    #[test]
    fn test_view_serializes_flat() {
        let view = ProductView::new(product(2, 1000, 3), CurrencyCode::USD);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["price"], 1000);
        assert_eq!(json["display_price"], "$10.00");
    }
}
