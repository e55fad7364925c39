//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{PgAdminDirectory, SessionError, SessionManager};

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    sessions: SessionManager<PgAdminDirectory>,
}

impl AppState {
    /// Create application state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Seal` if the session cipher cannot be derived
    /// from the configured secret.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, SessionError> {
        let sessions = SessionManager::new(
            &config.session_secret,
            PgAdminDirectory::new(pool.clone()),
            config.is_secure(),
        )?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sessions,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Session manager over the `admin_users` directory.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager<PgAdminDirectory> {
        &self.inner.sessions
    }
}
