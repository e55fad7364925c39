//! The identity store behind sessions and admin management.

use std::future::Future;

use sqlx::PgPool;

use lumiere_core::{AdminRole, AdminUserId, Email};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::{AdminCredentials, AdminUser};

/// Access to admin accounts.
///
/// The session manager only reads (`find_by_id`, `find_credentials`);
/// account management uses the rest.
///
/// `set_role`, `set_active` and `delete` must refuse with
/// `RepositoryError::Conflict` when the change would leave no active super
/// admin, checking and writing atomically.
pub trait AdminDirectory: Send + Sync {
    fn find_by_id(
        &self,
        id: AdminUserId,
    ) -> impl Future<Output = Result<Option<AdminUser>, RepositoryError>> + Send;

    fn find_credentials(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<AdminCredentials>, RepositoryError>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<AdminUser>, RepositoryError>> + Send;

    fn create(
        &self,
        email: &Email,
        password_hash: &str,
        role: AdminRole,
    ) -> impl Future<Output = Result<AdminUser, RepositoryError>> + Send;

    fn set_role(
        &self,
        id: AdminUserId,
        role: AdminRole,
    ) -> impl Future<Output = Result<AdminUser, RepositoryError>> + Send;

    fn set_active(
        &self,
        id: AdminUserId,
        is_active: bool,
    ) -> impl Future<Output = Result<AdminUser, RepositoryError>> + Send;

    fn set_password_hash(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn delete(&self, id: AdminUserId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// `PostgreSQL`-backed directory over the `admin_users` table.
#[derive(Debug, Clone)]
pub struct PgAdminDirectory {
    pool: PgPool,
}

impl PgAdminDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> AdminUserRepository<'_> {
        AdminUserRepository::new(&self.pool)
    }
}

impl AdminDirectory for PgAdminDirectory {
    async fn find_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        self.repo().get_by_id(id).await
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        self.repo().get_credentials_by_email(email).await
    }

    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        self.repo().list_all().await
    }

    async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        self.repo().create(email, password_hash, role).await
    }

    async fn set_role(&self, id: AdminUserId, role: AdminRole) -> Result<AdminUser, RepositoryError> {
        self.repo().update_role(id, role).await
    }

    async fn set_active(
        &self,
        id: AdminUserId,
        is_active: bool,
    ) -> Result<AdminUser, RepositoryError> {
        self.repo().update_status(id, is_active).await
    }

    async fn set_password_hash(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.repo().update_password(id, password_hash).await
    }

    async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        self.repo().delete(id).await
    }
}

/// In-memory directory for unit tests.
#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

    use chrono::Utc;

    use super::{
        AdminCredentials, AdminDirectory, AdminRole, AdminUser, AdminUserId, Email,
        RepositoryError,
    };
    use crate::db::admin_users::ensure_super_admin_remains;

    #[derive(Default)]
    pub struct InMemoryDirectory {
        records: Mutex<Vec<AdminCredentials>>,
        next_id: AtomicI32,
        offline: AtomicBool,
    }

    impl InMemoryDirectory {
        /// Insert an account directly, bypassing hashing policy.
        #[allow(clippy::unwrap_used)]
        pub fn insert(&self, email: &str, password_hash: &str, role: AdminRole) -> AdminUser {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let mut records = self.records.lock().unwrap();
            let now = Utc::now();
            let user = AdminUser {
                id: AdminUserId::new(id),
                email: Email::parse(email).unwrap(),
                role,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            records.push(AdminCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            });
            user
        }

        /// Make every call fail as if the database were unreachable.
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn check_online(&self) -> Result<(), RepositoryError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }

        fn active_super_admins(records: &[AdminCredentials]) -> Vec<AdminUserId> {
            records
                .iter()
                .filter(|r| r.user.is_active && r.user.role == AdminRole::SuperAdmin)
                .map(|r| r.user.id)
                .collect()
        }

        /// Apply `f` under the lock; `removes_super_admin` runs the
        /// last-super-admin check in the same critical section.
        #[allow(clippy::unwrap_used)]
        fn update<T>(
            &self,
            id: AdminUserId,
            removes_super_admin: bool,
            f: impl FnOnce(&mut AdminCredentials) -> T,
        ) -> Result<T, RepositoryError> {
            self.check_online()?;
            let mut records = self.records.lock().unwrap();
            if removes_super_admin {
                ensure_super_admin_remains(&Self::active_super_admins(&records), id)?;
            }
            let record = records
                .iter_mut()
                .find(|r| r.user.id == id)
                .ok_or(RepositoryError::NotFound)?;
            record.user.updated_at = Utc::now();
            Ok(f(record))
        }
    }

    #[allow(clippy::unwrap_used)]
    impl AdminDirectory for InMemoryDirectory {
        async fn find_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
            self.check_online()?;
            let records = self.records.lock().unwrap();
            Ok(records.iter().find(|r| r.user.id == id).map(|r| r.user.clone()))
        }

        async fn find_credentials(
            &self,
            email: &Email,
        ) -> Result<Option<AdminCredentials>, RepositoryError> {
            self.check_online()?;
            let records = self.records.lock().unwrap();
            Ok(records.iter().find(|r| &r.user.email == email).cloned())
        }

        async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
            self.check_online()?;
            let records = self.records.lock().unwrap();
            Ok(records.iter().rev().map(|r| r.user.clone()).collect())
        }

        async fn create(
            &self,
            email: &Email,
            password_hash: &str,
            role: AdminRole,
        ) -> Result<AdminUser, RepositoryError> {
            self.check_online()?;
            if self
                .records
                .lock()
                .unwrap()
                .iter()
                .any(|r| &r.user.email == email)
            {
                return Err(RepositoryError::Conflict("email already exists".to_string()));
            }
            Ok(self.insert(email.as_str(), password_hash, role))
        }

        async fn set_role(
            &self,
            id: AdminUserId,
            role: AdminRole,
        ) -> Result<AdminUser, RepositoryError> {
            self.update(id, role != AdminRole::SuperAdmin, |r| {
                r.user.role = role;
                r.user.clone()
            })
        }

        async fn set_active(
            &self,
            id: AdminUserId,
            is_active: bool,
        ) -> Result<AdminUser, RepositoryError> {
            self.update(id, !is_active, |r| {
                r.user.is_active = is_active;
                r.user.clone()
            })
        }

        async fn set_password_hash(
            &self,
            id: AdminUserId,
            password_hash: &str,
        ) -> Result<(), RepositoryError> {
            self.update(id, false, |r| r.password_hash = password_hash.to_string())
        }

        async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
            self.check_online()?;
            let mut records = self.records.lock().unwrap();
            ensure_super_admin_remains(&Self::active_super_admins(&records), id)?;
            let before = records.len();
            records.retain(|r| r.user.id != id);
            if records.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
    }
}
