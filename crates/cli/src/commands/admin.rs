//! Admin account commands.
//!
//! These run with operator authority: no session is involved, but the
//! account rules still hold (the last active super admin cannot be demoted
//! or deactivated).

use std::io::BufRead;

use lumiere_core::AdminRole;
use lumiere_admin::services::{AdminUserError, AdminUserService, PgAdminDirectory};
use thiserror::Error;

use super::{ConnectError, connect};

/// Environment variable read before falling back to stdin.
const PASSWORD_ENV: &str = "LUMIERE_ADMIN_PASSWORD";

#[derive(Debug, Error)]
pub enum AdminCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Admin(#[from] AdminUserError),

    #[error("could not read password: {0}")]
    Password(#[from] std::io::Error),

    #[error("no password given; set LUMIERE_ADMIN_PASSWORD or pipe it on stdin")]
    EmptyPassword,
}

/// Read the new admin's password from the environment or the first line of
/// stdin, so it never appears in shell history.
///
/// # Errors
///
/// Returns `AdminCommandError::EmptyPassword` if neither source has one.
pub fn read_password() -> Result<String, AdminCommandError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return non_empty(password);
    }

    tracing::info!("Reading password from stdin");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    non_empty(line.trim_end_matches(['\r', '\n']).to_string())
}

fn non_empty(password: String) -> Result<String, AdminCommandError> {
    if password.is_empty() {
        Err(AdminCommandError::EmptyPassword)
    } else {
        Ok(password)
    }
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the email, password, or database write is rejected.
pub async fn create(email: &str, password: &str, role: AdminRole) -> Result<(), AdminCommandError> {
    let directory = PgAdminDirectory::new(connect().await?);
    let user = AdminUserService::new(&directory)
        .create(email, password, role)
        .await?;

    tracing::info!(
        "Admin user created! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role.label()
    );
    Ok(())
}

/// Log every admin account, newest first.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub async fn list() -> Result<(), AdminCommandError> {
    let directory = PgAdminDirectory::new(connect().await?);
    let users = AdminUserService::new(&directory).list().await?;

    tracing::info!("{} admin account(s)", users.len());
    for user in users {
        tracing::info!(
            "  #{:<5} {:<40} {:<12} {}",
            user.id.to_string(),
            user.email.as_str(),
            user.role.as_str(),
            if user.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

/// # Errors
///
/// Returns `AdminUserError::NotFound` for an unknown email, or `Conflict`
/// when demoting the last active super admin.
pub async fn set_role(email: &str, role: AdminRole) -> Result<(), AdminCommandError> {
    let directory = PgAdminDirectory::new(connect().await?);
    let service = AdminUserService::new(&directory);

    let user = service.find_by_email(email).await?;
    let updated = service.change_role(user.id, role).await?;
    tracing::info!("{} is now {}", updated.email, updated.role.label());
    Ok(())
}

/// # Errors
///
/// Returns `AdminUserError::NotFound` for an unknown email, or `Conflict`
/// when deactivating the last active super admin.
pub async fn set_active(email: &str, is_active: bool) -> Result<(), AdminCommandError> {
    let directory = PgAdminDirectory::new(connect().await?);
    let service = AdminUserService::new(&directory);

    let user = service.find_by_email(email).await?;
    let updated = service.set_active_by_operator(user.id, is_active).await?;
    tracing::info!(
        "{} is now {}",
        updated.email,
        if updated.is_active { "active" } else { "inactive" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_is_rejected() {
        assert!(matches!(
            non_empty(String::new()),
            Err(AdminCommandError::EmptyPassword)
        ));
        assert!(non_empty("long enough".to_string()).is_ok());
    }
}
