//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use lumiere_core::{CurrencyCode, PricingPolicy};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`. Shopper state is not
/// here; it lives in each request's session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
}

impl AppState {
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Shipping and tax rules for every cart and checkout.
    #[must_use]
    pub fn pricing(&self) -> &PricingPolicy {
        &self.inner.config.pricing
    }

    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.config.currency
    }
}
