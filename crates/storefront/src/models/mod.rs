//! Domain models for the storefront.

pub mod order;
pub mod product;
pub mod session;

pub use order::{CheckoutDetails, Order, OrderItem, OrderLine, OrderWithItems};
pub use product::Product;
