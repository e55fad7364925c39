//! Admin authentication service.
//!
//! Email and password sign-in backed by Argon2id hashes in `admin_users`.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use lumiere_core::Email;

use super::session::AdminDirectory;
use crate::models::AdminUser;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash checked for unknown emails so every failed sign-in costs one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("lumiere-placeholder-password").ok());

/// Verify an email and password against the identity store.
///
/// The email is normalized before lookup. Unknown emails, inactive accounts,
/// unreadable hashes, and wrong passwords all fail the same way.
///
/// # Errors
///
/// - `AuthError::InvalidCredentials` if sign-in must be refused
/// - `AuthError::Repository` if the identity store fails
pub async fn verify_credentials<D: AdminDirectory>(
    directory: &D,
    email: &str,
    password: &str,
) -> Result<AdminUser, AuthError> {
    let Ok(email) = Email::parse(email) else {
        return Err(AuthError::InvalidCredentials);
    };

    let Some(credentials) = directory.find_credentials(&email).await? else {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, hash);
        }
        tracing::debug!("Sign-in attempt for unknown admin email");
        return Err(AuthError::InvalidCredentials);
    };

    verify_password(password, &credentials.password_hash)?;

    if !credentials.user.is_active {
        tracing::info!(admin_id = %credentials.user.id, "Sign-in refused for inactive admin");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(credentials.user)
}

/// Validate password against the policy.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lumiere_core::AdminRole;

    use super::*;
    use crate::services::session::AdminDirectory;
    use crate::services::session::memory::InMemoryDirectory;

    fn directory_with(email: &str, password: &str, role: AdminRole) -> InMemoryDirectory {
        let directory = InMemoryDirectory::default();
        directory.insert(email, &hash_password(password).unwrap(), role);
        directory
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let directory = directory_with("owner@lumiere.shop", "correct horse", AdminRole::SuperAdmin);
        let admin = verify_credentials(&directory, "owner@lumiere.shop", "correct horse")
            .await
            .unwrap();
        assert_eq!(admin.role, AdminRole::SuperAdmin);
    }

    #[tokio::test]
    async fn test_email_is_normalized() {
        let directory = directory_with("owner@lumiere.shop", "correct horse", AdminRole::Staff);
        let result = verify_credentials(&directory, "  Owner@Lumiere.SHOP ", "correct horse").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let directory = directory_with("owner@lumiere.shop", "correct horse", AdminRole::Staff);
        let result = verify_credentials(&directory, "owner@lumiere.shop", "battery staple").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let directory = InMemoryDirectory::default();
        let result = verify_credentials(&directory, "nobody@lumiere.shop", "whatever1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_malformed_email() {
        let directory = InMemoryDirectory::default();
        let result = verify_credentials(&directory, "not-an-email", "whatever1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_inactive_admin_is_refused() {
        let directory = InMemoryDirectory::default();
        let admin = directory.insert(
            "staff@lumiere.shop",
            &hash_password("correct horse").unwrap(),
            AdminRole::Staff,
        );
        directory.set_active(admin.id, false).await.unwrap();

        let result = verify_credentials(&directory, "staff@lumiere.shop", "correct horse").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_refused() {
        let directory = InMemoryDirectory::default();
        directory.insert("staff@lumiere.shop", "not-a-phc-string", AdminRole::Staff);
        let result = verify_credentials(&directory, "staff@lumiere.shop", "anything1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_store_failure_is_not_a_credential_error() {
        let directory = directory_with("owner@lumiere.shop", "correct horse", AdminRole::Staff);
        directory.set_offline(true);
        let result = verify_credentials(&directory, "owner@lumiere.shop", "correct horse").await;
        assert!(matches!(result, Err(AuthError::Repository(_))));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &a).is_ok());
    }
}
