//! Wishlist route handlers.

use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use lumiere_core::{ProductId, ProductSnapshot, Wishlist};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::session::{load_wishlist, save_wishlist};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<ProductSnapshot>,
    /// Whether the toggled product is now saved; absent on `GET`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

impl WishlistView {
    fn new(wishlist: &Wishlist, saved: Option<bool>) -> Self {
        Self {
            items: wishlist.items().to_vec(),
            saved,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: ProductId,
}

/// GET /wishlist
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<WishlistView>> {
    let wishlist = load_wishlist(&session).await?;
    Ok(Json(WishlistView::new(&wishlist, None)))
}

/// POST /wishlist/toggle
///
/// Unsaving never touches the catalog, so products that were deactivated
/// since they were saved can still be removed.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ToggleForm>,
) -> Result<Json<WishlistView>> {
    let mut wishlist = load_wishlist(&session).await?;

    let saved = if wishlist.remove(form.product_id) {
        false
    } else {
        let product = ProductRepository::new(state.pool())
            .get_active(form.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
        wishlist.add(product.snapshot())
    };

    save_wishlist(&session, &wishlist).await?;
    Ok(Json(WishlistView::new(&wishlist, Some(saved))))
}
