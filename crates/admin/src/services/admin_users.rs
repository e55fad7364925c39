//! Admin account management.
//!
//! Every operation that could leave the console without an active super
//! admin is refused, and an admin cannot deactivate or delete themselves.

use thiserror::Error;

use lumiere_core::{AdminRole, AdminUserId, Email, EmailError};

use super::auth::{self, AuthError};
use super::session::AdminDirectory;
use crate::db::RepositoryError;
use crate::models::{AdminSession, AdminUser};

/// Errors from admin account management.
#[derive(Debug, Error)]
pub enum AdminUserError {
    #[error("admin user not found")]
    NotFound,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The change would break an account invariant.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AdminUserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}

/// Admin account management over an identity store.
pub struct AdminUserService<'a, D> {
    directory: &'a D,
}

impl<'a, D: AdminDirectory> AdminUserService<'a, D> {
    #[must_use]
    pub const fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// All admins, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AdminUserError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<AdminUser>, AdminUserError> {
        Ok(self.directory.list().await?)
    }

    /// Create an admin with a hashed password.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::InvalidEmail` if the email is malformed
    /// - `AdminUserError::Auth` if the password is too weak
    /// - `AdminUserError::Conflict` if the email is taken
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        role: AdminRole,
    ) -> Result<AdminUser, AdminUserError> {
        let email = Email::parse(email)?;
        auth::validate_password(password)?;
        let hash = auth::hash_password(password)?;

        let user = self.directory.create(&email, &hash, role).await?;
        tracing::info!(admin_id = %user.id, role = %user.role, "Admin user created");
        Ok(user)
    }

    /// Change an admin's role.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::NotFound` if the admin does not exist
    /// - `AdminUserError::Conflict` if this demotes the last active super admin
    pub async fn change_role(
        &self,
        id: AdminUserId,
        role: AdminRole,
    ) -> Result<AdminUser, AdminUserError> {
        let target = self.get(id).await?;
        let user = self.directory.set_role(id, role).await?;
        tracing::info!(admin_id = %id, from = %target.role, to = %role, "Admin role changed");
        Ok(user)
    }

    /// Activate or deactivate an admin.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::NotFound` if the admin does not exist
    /// - `AdminUserError::Conflict` if `actor` deactivates themselves or the
    ///   last active super admin
    pub async fn set_active(
        &self,
        actor: &AdminSession,
        id: AdminUserId,
        is_active: bool,
    ) -> Result<AdminUser, AdminUserError> {
        if !is_active && actor.id == id {
            return Err(AdminUserError::Conflict(
                "you cannot deactivate your own account".to_string(),
            ));
        }
        self.apply_active(id, is_active).await
    }

    /// Activate or deactivate an admin from an operator shell, where there
    /// is no signed-in actor. The last active super admin is still kept.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::NotFound` if the admin does not exist
    /// - `AdminUserError::Conflict` if this deactivates the last active
    ///   super admin
    pub async fn set_active_by_operator(
        &self,
        id: AdminUserId,
        is_active: bool,
    ) -> Result<AdminUser, AdminUserError> {
        self.apply_active(id, is_active).await
    }

    /// Replace an admin's password.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::Auth` if the password is too weak
    /// - `AdminUserError::NotFound` if the admin does not exist
    pub async fn reset_password(
        &self,
        id: AdminUserId,
        password: &str,
    ) -> Result<(), AdminUserError> {
        auth::validate_password(password)?;
        let hash = auth::hash_password(password)?;
        self.directory.set_password_hash(id, &hash).await?;
        tracing::info!(admin_id = %id, "Admin password reset");
        Ok(())
    }

    /// Delete an admin.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::NotFound` if the admin does not exist
    /// - `AdminUserError::Conflict` if `actor` deletes themselves or the last
    ///   active super admin
    pub async fn delete(&self, actor: &AdminSession, id: AdminUserId) -> Result<(), AdminUserError> {
        if actor.id == id {
            return Err(AdminUserError::Conflict(
                "you cannot delete your own account".to_string(),
            ));
        }
        self.directory.delete(id).await?;
        tracing::info!(admin_id = %id, "Admin user deleted");
        Ok(())
    }

    /// Look up an admin by email.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::InvalidEmail` if the email is malformed
    /// - `AdminUserError::NotFound` if no admin has this email
    pub async fn find_by_email(&self, email: &str) -> Result<AdminUser, AdminUserError> {
        let email = Email::parse(email)?;
        self.directory
            .find_credentials(&email)
            .await?
            .map(|credentials| credentials.user)
            .ok_or(AdminUserError::NotFound)
    }

    async fn apply_active(
        &self,
        id: AdminUserId,
        is_active: bool,
    ) -> Result<AdminUser, AdminUserError> {
        let user = self.directory.set_active(id, is_active).await?;
        tracing::info!(admin_id = %id, is_active, "Admin status changed");
        Ok(user)
    }

    async fn get(&self, id: AdminUserId) -> Result<AdminUser, AdminUserError> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or(AdminUserError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::session::memory::InMemoryDirectory;

    fn session(user: &AdminUser) -> AdminSession {
        AdminSession::from(user)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let directory = InMemoryDirectory::default();
        let service = AdminUserService::new(&directory);

        let created = service
            .create(" New@Lumiere.shop", "long enough", AdminRole::Staff)
            .await
            .unwrap();
        assert_eq!(created.email.as_str(), "new@lumiere.shop");
        assert!(created.is_active);

        let all = service.list().await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let directory = InMemoryDirectory::default();
        directory.insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let service = AdminUserService::new(&directory);

        let result = service
            .create("STAFF@lumiere.shop", "long enough", AdminRole::Staff)
            .await;
        assert!(matches!(result, Err(AdminUserError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_weak_password_and_bad_email() {
        let directory = InMemoryDirectory::default();
        let service = AdminUserService::new(&directory);

        assert!(matches!(
            service.create("a@lumiere.shop", "short", AdminRole::Staff).await,
            Err(AdminUserError::Auth(AuthError::WeakPassword(_)))
        ));
        assert!(matches!(
            service.create("nope", "long enough", AdminRole::Staff).await,
            Err(AdminUserError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_cannot_demote_last_super_admin() {
        let directory = InMemoryDirectory::default();
        let owner = directory.insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let service = AdminUserService::new(&directory);

        let result = service.change_role(owner.id, AdminRole::Manager).await;
        assert!(matches!(result, Err(AdminUserError::Conflict(_))));

        directory.insert("second@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let demoted = service.change_role(owner.id, AdminRole::Manager).await.unwrap();
        assert_eq!(demoted.role, AdminRole::Manager);
    }

    #[tokio::test]
    async fn test_cannot_delete_or_deactivate_last_super_admin() {
        let directory = InMemoryDirectory::default();
        let owner = directory.insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let other = directory.insert("other@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let service = AdminUserService::new(&directory);

        service
            .set_active(&session(&owner), other.id, false)
            .await
            .unwrap();

        // `other` is inactive, so `owner` is the last active super admin.
        let actor = session(&other);
        assert!(matches!(
            service.set_active(&actor, owner.id, false).await,
            Err(AdminUserError::Conflict(_))
        ));
        assert!(matches!(
            service.delete(&actor, owner.id).await,
            Err(AdminUserError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_super_admins_cannot_remove_each_other_concurrently() {
        let directory = InMemoryDirectory::default();
        let first = directory.insert("first@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let second = directory.insert("second@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let service = AdminUserService::new(&directory);

        let first_session = session(&first);
        let (a, b) = tokio::join!(
            service.set_active(&first_session, second.id, false),
            service.change_role(first.id, AdminRole::Manager),
        );
        assert_eq!(
            [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
            1,
            "exactly one removal may succeed"
        );

        let remaining = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.is_active && u.role == AdminRole::SuperAdmin)
            .count();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_directory_refuses_last_super_admin_removal() {
        let directory = InMemoryDirectory::default();
        let owner = directory.insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);

        // The store itself holds the guard, not only the service
        assert!(matches!(
            directory.set_active(owner.id, false).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(matches!(
            directory.set_role(owner.id, AdminRole::Staff).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(matches!(
            directory.delete(owner.id).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(directory.set_active(owner.id, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_cannot_remove_self() {
        let directory = InMemoryDirectory::default();
        let owner = directory.insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);
        directory.insert("second@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let service = AdminUserService::new(&directory);

        let actor = session(&owner);
        assert!(matches!(
            service.set_active(&actor, owner.id, false).await,
            Err(AdminUserError::Conflict(_))
        ));
        assert!(matches!(
            service.delete(&actor, owner.id).await,
            Err(AdminUserError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_staff() {
        let directory = InMemoryDirectory::default();
        let owner = directory.insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let staff = directory.insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let service = AdminUserService::new(&directory);

        service.delete(&session(&owner), staff.id).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 1);
        assert!(matches!(
            service.delete(&session(&owner), staff.id).await,
            Err(AdminUserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_allows_sign_in() {
        let directory = InMemoryDirectory::default();
        let staff = directory.insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let service = AdminUserService::new(&directory);

        service.reset_password(staff.id, "brand new pass").await.unwrap();
        let admin = auth::verify_credentials(&directory, "staff@lumiere.shop", "brand new pass")
            .await
            .unwrap();
        assert_eq!(admin.id, staff.id);
    }

    #[tokio::test]
    async fn test_operator_can_deactivate_but_not_last_super_admin() {
        let directory = InMemoryDirectory::default();
        let owner = directory.insert("owner@lumiere.shop", "hash", AdminRole::SuperAdmin);
        let staff = directory.insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let service = AdminUserService::new(&directory);

        let updated = service.set_active_by_operator(staff.id, false).await.unwrap();
        assert!(!updated.is_active);
        assert!(matches!(
            service.set_active_by_operator(owner.id, false).await,
            Err(AdminUserError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let directory = InMemoryDirectory::default();
        let staff = directory.insert("staff@lumiere.shop", "hash", AdminRole::Staff);
        let service = AdminUserService::new(&directory);

        let found = service.find_by_email(" Staff@Lumiere.shop ").await.unwrap();
        assert_eq!(found.id, staff.id);
        assert!(matches!(
            service.find_by_email("ghost@lumiere.shop").await,
            Err(AdminUserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_missing_admin_is_not_found() {
        let directory = InMemoryDirectory::default();
        let service = AdminUserService::new(&directory);
        assert!(matches!(
            service.change_role(AdminUserId::new(99), AdminRole::Staff).await,
            Err(AdminUserError::NotFound)
        ));
    }
}
