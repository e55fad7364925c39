//! Site settings (super admin only).

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::AppError;
use crate::middleware::RequireSuperAdmin;
use crate::models::{SiteSettings, SiteSettingsInput};
use crate::state::AppState;

/// GET /admin/settings
///
/// Answers the defaults until the settings are first saved.
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<SiteSettings>, AppError> {
    Ok(Json(SettingsRepository::new(state.pool()).get().await?))
}

/// PUT /admin/settings
#[instrument(skip(admin, state, input), fields(admin_id = %admin.id))]
pub async fn update(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(input): Json<SiteSettingsInput>,
) -> Result<Json<SiteSettings>, AppError> {
    let input = input.normalized().map_err(AppError::BadRequest)?;
    let settings = SettingsRepository::new(state.pool()).update(&input).await?;
    tracing::info!(brand_name = %settings.brand_name, "Site settings updated");
    Ok(Json(settings))
}
