//! Infrastructure layer: storage backends and checkout orchestration.

pub mod checkout;
pub mod store;


pub use checkout::{CheckoutService, PlaceOrderRequest};
pub use store::{
    AddressStore, CatalogStore, InMemoryStore, LedgerError, OrderLedger, PostgresStore,
    StoreError,
};
