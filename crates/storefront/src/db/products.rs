//! Read-only catalog queries for shoppers.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lumiere_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::product::Product;

const PRODUCT_COLUMNS: &str = "id, name, description, price, discount_price, category, \
    images, stock, created_at";

/// Upper bound on search results.
const SEARCH_LIMIT: i64 = 50;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: i64,
    discount_price: Option<i64>,
    category: String,
    images: Vec<String>,
    stock: i32,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Money::from_minor(row.price),
            discount_price: row.discount_price.map(Money::from_minor),
            category: row.category,
            images: row.images,
            stock: row.stock,
            created_at: row.created_at,
        }
    }
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active products, newest first, optionally limited to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active AND ($1::TEXT IS NULL OR category = $1) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Load the active products among `ids`. Inactive or unknown IDs are
    /// simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) AND is_active"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive substring search over name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(query.trim()));

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active AND (name ILIKE $1 OR description ILIKE $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        ))
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Escape `LIKE` wildcards so shopper input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
