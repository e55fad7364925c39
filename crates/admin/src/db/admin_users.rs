//! Admin user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use lumiere_core::{AdminRole, AdminUserId, Email};

use super::{RepositoryError, map_unique_violation};
use crate::models::admin_user::{AdminCredentials, AdminUser};

const USER_COLUMNS: &str = "id, email, role, is_active, created_at, updated_at";

/// Message for changes that would leave no active super admin.
pub const LAST_SUPER_ADMIN: &str = "cannot remove the last active super admin";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<AdminRole>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            email,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminCredentialsRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

impl TryFrom<AdminCredentialsRow> for AdminCredentials {
    type Error = RepositoryError;

    fn try_from(row: AdminCredentialsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user: row.user.try_into()?,
            password_hash: row.password_hash,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM admin_users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM admin_users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an admin user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminCredentialsRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM admin_users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new, active admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "INSERT INTO admin_users (email, password_hash, role, is_active) \
             VALUES ($1, $2, $3, TRUE) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        row.try_into()
    }

    /// Change an admin's role.
    ///
    /// Demotions lock the active super admin rows first, so two concurrent
    /// demotions cannot both pass the last-super-admin check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no admin has this ID.
    /// Returns `RepositoryError::Conflict` if this demotes the last active
    /// super admin.
    pub async fn update_role(
        &self,
        id: AdminUserId,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if role != AdminRole::SuperAdmin {
            let locked = lock_active_super_admins(&mut tx).await?;
            ensure_super_admin_remains(&locked, id)?;
        }

        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "UPDATE admin_users SET role = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        row.try_into()
    }

    /// Activate or deactivate an admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no admin has this ID.
    /// Returns `RepositoryError::Conflict` if this deactivates the last
    /// active super admin.
    pub async fn update_status(
        &self,
        id: AdminUserId,
        is_active: bool,
    ) -> Result<AdminUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !is_active {
            let locked = lock_active_super_admins(&mut tx).await?;
            ensure_super_admin_remains(&locked, id)?;
        }

        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "UPDATE admin_users SET is_active = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        row.try_into()
    }

    /// Replace an admin's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no admin has this ID.
    pub async fn update_password(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE admin_users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no admin has this ID.
    /// Returns `RepositoryError::Conflict` if this is the last active super
    /// admin.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let locked = lock_active_super_admins(&mut tx).await?;
        ensure_super_admin_remains(&locked, id)?;

        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Lock the active super admin rows until `tx` ends and return their IDs.
///
/// A concurrent transaction doing the same waits here, then re-reads the
/// rows after this one commits.
async fn lock_active_super_admins(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<Vec<AdminUserId>, RepositoryError> {
    let ids: Vec<i32> = sqlx::query_scalar(
        "SELECT id FROM admin_users WHERE role = $1 AND is_active ORDER BY id FOR UPDATE",
    )
    .bind(AdminRole::SuperAdmin.as_str())
    .fetch_all(&mut **tx)
    .await?;

    Ok(ids.into_iter().map(AdminUserId::new).collect())
}

/// Refuse a change that takes `id` out of `active_super_admins` when it is
/// the only one left.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` with [`LAST_SUPER_ADMIN`].
pub fn ensure_super_admin_remains(
    active_super_admins: &[AdminUserId],
    id: AdminUserId,
) -> Result<(), RepositoryError> {
    if active_super_admins == [id] {
        return Err(RepositoryError::Conflict(LAST_SUPER_ADMIN.to_string()));
    }
    Ok(())
}
