//! Order placement domain module.
//!
//! This crate contains the business rules for turning a client-submitted
//! cart into an order, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage): cart validation and demand aggregation,
//! authoritative pricing against catalog rows, order assembly with the
//! total invariant, and the placement failure taxonomy.

pub mod cart;
pub mod error;
pub mod order;
pub mod pricing;

pub use cart::{CartDemand, CartLine, aggregate_demand};
pub use error::PlaceOrderError;
pub use order::{Order, OrderLine, OrderStatus, PaymentMethod, generate_order_number};
pub use pricing::ResolvedLine;
