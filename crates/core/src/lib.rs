//! Lumiere Core - Shared types library.
//!
//! This crate provides common types used across all Lumiere components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout)
//! - `admin` - Role-gated administration console
//! - `cli` - Command-line tools for admin bootstrap and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure computations - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere, including for auditing historical order totals.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, roles, and statuses
//! - [`pricing`] - Cart pricing (subtotal, shipping, tax, total)
//! - [`cart`] - Shopper cart and wishlist context objects

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartItem, ProductSnapshot, Wishlist};
pub use pricing::{CartLine, PriceSummary, PricingError, PricingPolicy, price_cart};
pub use types::*;
