//! Admin account management (super admin only).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use lumiere_core::{AdminRole, AdminUserId};

use crate::error::AppError;
use crate::middleware::RequireSuperAdmin;
use crate::models::AdminUser;
use crate::services::AdminUserService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub role: AdminRole,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: AdminRole,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// GET /admin/users
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>, AppError> {
    let service = AdminUserService::new(state.sessions().directory());
    Ok(Json(service.list().await?))
}

/// POST /admin/users
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id, role = %body.role))]
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminUser>), AppError> {
    let service = AdminUserService::new(state.sessions().directory());
    let user = service.create(&body.email, &body.password, body.role).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /admin/users/{id}/role
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn change_role(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<AdminUser>, AppError> {
    let service = AdminUserService::new(state.sessions().directory());
    Ok(Json(service.change_role(id, body.role).await?))
}

/// POST /admin/users/{id}/status
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn set_status(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<AdminUser>, AppError> {
    let service = AdminUserService::new(state.sessions().directory());
    Ok(Json(service.set_active(&admin, id, body.is_active).await?))
}

/// POST /admin/users/{id}/password
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id))]
pub async fn reset_password(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
    Json(body): Json<PasswordRequest>,
) -> Result<StatusCode, AppError> {
    let service = AdminUserService::new(state.sessions().directory());
    service.reset_password(id, &body.password).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /admin/users/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
) -> Result<StatusCode, AppError> {
    let service = AdminUserService::new(state.sessions().directory());
    service.delete(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
