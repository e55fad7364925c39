//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Amber Candle
//!     description: Hand-poured soy wax, 40 hour burn.
//!     price: 2400          # minor units
//!     discount_price: 1999 # optional
//!     category: candles
//!     images: [https://cdn.lumiere.shop/amber.jpg]
//!     stock: 25
//!     is_active: true      # optional, default true
//! ```
//!
//! The whole file is validated before anything is written, and the inserts
//! run in file order.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use lumiere_admin::db::{ProductRepository, RepositoryError};
use lumiere_admin::models::ProductInput;

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{} invalid product(s):\n{}", .0.len(), .0.join("\n"))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("database error: {0}")]
    Database(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    products: Vec<ProductInput>,
}

/// Parse a seed file and check every product.
///
/// Errors name the product by its 1-based position and name.
fn parse(content: &str) -> Result<Vec<ProductInput>, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let errors: Vec<String> = file
        .products
        .iter()
        .enumerate()
        .filter_map(|(i, product)| {
            product
                .validate()
                .err()
                .map(|e| format!("  #{} {:?}: {e}", i + 1, product.name))
        })
        .collect();

    if errors.is_empty() {
        Ok(file.products)
    } else {
        Err(SeedError::Invalid(errors))
    }
}

/// Insert the products in `path`.
///
/// # Errors
///
/// Returns `SeedError::Invalid` listing every bad product if any fails
/// validation; nothing is written in that case.
pub async fn products(path: &Path, dry_run: bool) -> Result<(), SeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let products = parse(&content)?;
    tracing::info!(count = products.len(), path = %path.display(), "Seed file validated");

    if dry_run {
        tracing::info!("Dry run, nothing written");
        return Ok(());
    }

    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);
    for input in &products {
        let product = repo.create(input).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Inserted");
    }

    tracing::info!("Seeding complete! {} product(s) inserted", products.len());
    Ok(())
}
