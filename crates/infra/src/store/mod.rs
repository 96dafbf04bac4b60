//! Storage contracts for the checkout path.
//!
//! Three collaborator interfaces back order placement: the catalog (live
//! product rows), the address book (owner-scoped snapshots), and the order
//! ledger (atomic multi-row commit). Implementations: [`InMemoryStore`]
//! for tests/dev and [`PostgresStore`] for production.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pawmart_accounts::AddressSnapshot;
use pawmart_catalog::Product;
use pawmart_core::{AddressId, OrderId, ProductId, UserId};
use pawmart_orders::Order;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Read-side store failure (infrastructure, not domain).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A persisted record could not be decoded into its domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Commit-side ledger failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A conditional stock decrement found fewer units than requested.
    /// The whole commit was rolled back; nothing persisted.
    #[error(
        "stock conflict for product {product_id}: requested {requested}, available {available}"
    )]
    StockConflict {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Infrastructure failure (connection loss, timeout, rollback). The
    /// transaction must be assumed not committed.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Live product lookup for pricing and availability.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
}

/// Owner-scoped address lookup.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Returns `None` when the address does not exist **or** belongs to a
    /// different account; callers cannot distinguish the two on purpose.
    async fn address_for(
        &self,
        id: AddressId,
        owner: UserId,
    ) -> Result<Option<AddressSnapshot>, StoreError>;
}

/// Durable order ledger with atomic commit.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Atomically decrement stock for every line of `order` and persist the
    /// order with its lines. All writes succeed together or none persist.
    ///
    /// The decrement must be conditional on sufficient stock at commit
    /// time (not on any earlier read), so that concurrent commits for the
    /// same product cannot drive stock below zero.
    async fn commit(&self, order: &Order) -> Result<(), LedgerError>;

    /// All orders for one account, newest first.
    async fn orders_for_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError>;

    /// One order, owner-scoped.
    async fn find_order(&self, owner: UserId, id: OrderId)
    -> Result<Option<Order>, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(id).await
    }
}

#[async_trait]
impl<S> AddressStore for Arc<S>
where
    S: AddressStore + ?Sized,
{
    async fn address_for(
        &self,
        id: AddressId,
        owner: UserId,
    ) -> Result<Option<AddressSnapshot>, StoreError> {
        (**self).address_for(id, owner).await
    }
}

#[async_trait]
impl<S> OrderLedger for Arc<S>
where
    S: OrderLedger + ?Sized,
{
    async fn commit(&self, order: &Order) -> Result<(), LedgerError> {
        (**self).commit(order).await
    }

    async fn orders_for_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_owner(owner).await
    }

    async fn find_order(
        &self,
        owner: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, StoreError> {
        (**self).find_order(owner, id).await
    }
}
