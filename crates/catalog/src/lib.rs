//! Catalog domain module.
//!
//! The `Product` record the Catalog Store exposes to checkout: authoritative
//! price and name, an active flag, and the live stock quantity.

pub mod product;

pub use product::Product;
