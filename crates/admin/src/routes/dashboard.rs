//! Admin dashboard.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use lumiere_core::{AdminRole, Permission};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{AdminSession, OrderStats};
use crate::state::AppState;

/// Role metadata shown next to the signed-in identity.
#[derive(Debug, Serialize)]
pub struct RoleView {
    pub role: AdminRole,
    pub label: &'static str,
    pub description: &'static str,
}

impl From<AdminRole> for RoleView {
    fn from(role: AdminRole) -> Self {
        Self {
            role,
            label: role.label(),
            description: role.description(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub admin: AdminSession,
    pub role: RoleView,
    pub capabilities: &'static [Permission],
    /// Present only for roles with `view_analytics`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<OrderStats>,
}

/// GET /admin
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    let stats = if admin.can(Permission::ViewAnalytics) {
        Some(OrderRepository::new(state.pool()).stats().await?)
    } else {
        None
    };

    Ok(Json(DashboardView {
        role: admin.role.into(),
        capabilities: admin.role.permissions(),
        admin,
        stats,
    }))
}
