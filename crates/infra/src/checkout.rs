//! Order placement orchestration (application-level).
//!
//! `CheckoutService` implements the one operation this system must get
//! right: turning a cart into a durable order while keeping inventory
//! consistent under concurrent checkouts. The pipeline:
//!
//! ```text
//! PlaceOrderRequest
//!   1. validate cart shape, aggregate demand per distinct product
//!   2. resolve shipping address (owner-scoped)
//!   3. price every distinct product from the live catalog
//!   4. advisory capacity check
//!   5. atomic commit: conditional decrements + order + lines
//! ```
//!
//! Steps 1-4 are local rejections that touch nothing. Step 5 is
//! all-or-nothing: the ledger either persists the order, its lines and
//! every decrement together, or leaves all state unchanged. The commit's
//! conditional decrement is the authoritative stock check; step 4 only
//! exists to reject hopeless carts without opening a transaction.
//!
//! This module contains no IO itself; it composes the storage traits.

use std::sync::Arc;

use tracing::instrument;

use pawmart_core::{AddressId, UserId};
use pawmart_orders::{
    CartLine, Order, PaymentMethod, PlaceOrderError, ResolvedLine, aggregate_demand,
};

use crate::store::{AddressStore, CatalogStore, LedgerError, OrderLedger, StoreError};

/// One order placement attempt. All inputs are explicit; there is no
/// ambient session state.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub owner_id: UserId,
    pub lines: Vec<CartLine>,
    pub shipping_address_id: AddressId,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Stateless placement engine over the three storage contracts.
///
/// Every invocation is an independent unit of work; all state lives in the
/// backing store, so the service can be cloned and shared freely.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStore>,
    addresses: Arc<dyn AddressStore>,
    ledger: Arc<dyn OrderLedger>,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        addresses: Arc<dyn AddressStore>,
        ledger: Arc<dyn OrderLedger>,
    ) -> Self {
        Self {
            catalog,
            addresses,
            ledger,
        }
    }

    /// Place an order, or fail leaving all state unchanged.
    ///
    /// On success the returned order exists durably with
    /// `total == sum(line totals)` and stock decremented by exactly the
    /// committed quantities. Placement is not idempotent across calls:
    /// each call is a fresh attempt, and only `CommitFailed` is worth
    /// retrying.
    #[instrument(
        skip(self, request),
        fields(owner_id = %request.owner_id, cart_lines = request.lines.len()),
        err
    )]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, PlaceOrderError> {
        let demand = aggregate_demand(&request.lines)?;

        let shipping_address = self
            .addresses
            .address_for(request.shipping_address_id, request.owner_id)
            .await
            .map_err(lookup_failure)?
            .ok_or(PlaceOrderError::InvalidAddress)?;

        let mut resolved = Vec::with_capacity(demand.len());
        for item in &demand {
            let product = self
                .catalog
                .product(item.product_id)
                .await
                .map_err(lookup_failure)?
                .ok_or(PlaceOrderError::ProductUnavailable(item.product_id))?;
            resolved.push(ResolvedLine::resolve(&product, *item)?);
        }

        let order = Order::assemble(
            request.owner_id,
            resolved,
            shipping_address,
            request.payment_method,
            request.notes,
        )?;

        self.ledger.commit(&order).await.map_err(commit_failure)?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            "order placed"
        );

        Ok(order)
    }

    /// All orders for one account, newest first.
    pub async fn orders_for_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        self.ledger.orders_for_owner(owner).await
    }

    /// One order, owner-scoped.
    pub async fn find_order(
        &self,
        owner: UserId,
        id: pawmart_core::OrderId,
    ) -> Result<Option<Order>, StoreError> {
        self.ledger.find_order(owner, id).await
    }
}

/// Store IO failures during lookups are infrastructure faults, same
/// retry-the-whole-call semantics as a failed commit.
fn lookup_failure(e: StoreError) -> PlaceOrderError {
    PlaceOrderError::CommitFailed(e.to_string())
}

fn commit_failure(e: LedgerError) -> PlaceOrderError {
    match e {
        // A losing conditional decrement is a deterministic stock outcome,
        // not an infrastructure fault.
        LedgerError::StockConflict {
            product_id,
            requested,
            available,
        } => PlaceOrderError::InsufficientStock {
            product_id,
            requested,
            available,
        },
        LedgerError::Unavailable(msg) => PlaceOrderError::CommitFailed(msg),
    }
}
