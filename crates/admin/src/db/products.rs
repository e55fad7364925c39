//! Product repository for catalog management.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lumiere_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::product::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, description, price, discount_price, category, \
    images, stock, is_active, created_at";

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
    is_active: bool,
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
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products including inactive ones, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
                (name, description, price, discount_price, category, images, stock, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price.minor())
        .bind(input.discount_price.map(Money::minor))
        .bind(&input.category)
        .bind(&input.images)
        .bind(input.stock)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
                name = $2, description = $3, price = $4, discount_price = $5, \
                category = $6, images = $7, stock = $8, is_active = $9 \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price.minor())
        .bind(input.discount_price.map(Money::minor))
        .bind(&input.category)
        .bind(&input.images)
        .bind(input.stock)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product. Products referenced by past orders cannot be
    /// deleted; deactivate them instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID, or
    /// `RepositoryError::Conflict` if order items still reference it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "product is referenced by orders; deactivate it instead".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
