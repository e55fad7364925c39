//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Argon2 password hashing and credential verification
//! - `session` - Sealed session cookies and role/permission gates
//! - `admin_users` - Admin account management with last-super-admin guards

pub mod admin_users;
pub mod auth;
pub mod session;

pub use admin_users::{AdminUserError, AdminUserService};
pub use auth::{AuthError, verify_credentials};
pub use session::{AdminDirectory, PgAdminDirectory, SessionError, SessionManager};
