//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, attach request data)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (`x-request-id` recorded on the span and in Sentry)
//! 4. Security headers (locked-down CSP, no caching)
//! 5. Rate limiting on `POST /admin-login` only
//!
//! Authentication is not a layer: each handler names the gate it needs via
//! an extractor from [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{
    AuthRejection, Gate, OptionalAdmin, RequireAdmin, RequireManageOrders, RequireManageProducts,
    RequireSuperAdmin, authorize,
};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
