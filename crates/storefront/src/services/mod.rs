//! Business logic services for the storefront.

pub mod checkout;

pub use checkout::{CheckoutError, Quote};
