//! Domain models for admin.

pub mod admin_user;
pub mod order;
pub mod product;
pub mod session;
pub mod settings;

pub use admin_user::{AdminCredentials, AdminUser};
pub use order::{Order, OrderItem, OrderStats, OrderWithItems};
pub use product::{Product, ProductInput};
pub use session::AdminSession;
pub use settings::{SiteSettings, SiteSettingsInput};
