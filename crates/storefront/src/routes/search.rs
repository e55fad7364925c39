//! Product search.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::routes::products::{ProductView, views};
use crate::state::AppState;

/// Longer queries are rejected before hitting the database.
const MAX_QUERY_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<ProductView>,
}

/// GET /search?q=
///
/// A blank query returns no results without touching the database; one over
/// [`MAX_QUERY_CHARS`] is a `400`.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>> {
    let query = params.q.trim().to_string();
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "search query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }
    if query.is_empty() {
        return Ok(Json(SearchResults {
            query,
            results: Vec::new(),
        }));
    }

    let products = ProductRepository::new(state.pool()).search(&query).await?;
    tracing::debug!(count = products.len(), "Search completed");

    Ok(Json(SearchResults {
        results: views(products, state.currency()),
        query,
    }))
}
