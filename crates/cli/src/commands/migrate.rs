//! Tables owned by third-party crates.
//!
//! The application schema is managed outside this repository; the only
//! table created here is the tower-sessions store used by the storefront.

use tower_sessions_sqlx_store::PostgresStore;

use super::connect;

/// Create the `tower_sessions` schema and session table if missing.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the DDL fails.
pub async fn sessions() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool).migrate().await?;
    tracing::info!("Session table ready");
    Ok(())
}
