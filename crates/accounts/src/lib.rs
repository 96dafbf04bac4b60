//! Accounts domain module.
//!
//! Address-book records and the immutable shipping snapshot embedded into
//! orders at commit time.

pub mod address;

pub use address::{Address, AddressSnapshot};
