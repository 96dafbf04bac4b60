use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pawmart_accounts::{Address, AddressSnapshot};
use pawmart_catalog::Product;
use pawmart_core::{AddressId, OrderId, ProductId, UserId};
use pawmart_orders::Order;

use super::{AddressStore, CatalogStore, LedgerError, OrderLedger, StoreError};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    addresses: HashMap<AddressId, Address>,
    orders: Vec<Order>,
}

/// In-memory backing store implementing all three storage contracts.
///
/// Intended for tests/dev. A single lock guards every relation, so the
/// commit's check-and-decrement runs as one atomic unit under the write
/// lock, matching the conditional-decrement contract of [`OrderLedger`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product. Panics if the state lock is poisoned; a silently
    /// dropped fixture row is worse than a loud failure here.
    pub fn insert_product(&self, product: Product) {
        let mut state = self.state.write().expect("state lock poisoned");
        state.products.insert(product.id, product);
    }

    pub fn insert_address(&self, address: Address) {
        let mut state = self.state.write().expect("state lock poisoned");
        state.addresses.insert(address.id, address);
    }

    pub fn remove_product(&self, id: ProductId) {
        let mut state = self.state.write().expect("state lock poisoned");
        state.products.remove(&id);
    }

    /// Live stock for a product, if it exists.
    pub fn stock_of(&self, id: ProductId) -> Option<u32> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.products.get(&id).map(|p| p.stock_quantity))
    }

    pub fn order_count(&self) -> usize {
        self.state.read().map(|s| s.orders.len()).unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.products.get(&id).cloned())
    }
}

#[async_trait]
impl AddressStore for InMemoryStore {
    async fn address_for(
        &self,
        id: AddressId,
        owner: UserId,
    ) -> Result<Option<AddressSnapshot>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .addresses
            .get(&id)
            .filter(|a| a.is_owned_by(owner))
            .map(AddressSnapshot::from))
    }
}

#[async_trait]
impl OrderLedger for InMemoryStore {
    async fn commit(&self, order: &Order) -> Result<(), LedgerError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;

        // Validate every decrement before touching anything, so a failure
        // on the third line cannot leave the first two applied.
        for line in &order.lines {
            // A row deleted since pricing has zero obtainable units, the
            // same conflict the conditional UPDATE reports in Postgres.
            let Some(product) = state.products.get(&line.product_id) else {
                return Err(LedgerError::StockConflict {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: 0,
                });
            };
            if product.stock_quantity < line.quantity {
                return Err(LedgerError::StockConflict {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: product.stock_quantity,
                });
            }
        }

        for line in &order.lines {
            if let Some(product) = state.products.get_mut(&line.product_id) {
                product.stock_quantity -= line.quantity;
            }
        }
        state.orders.push(order.clone());

        Ok(())
    }

    async fn orders_for_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.owner_id == owner)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn find_order(
        &self,
        owner: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id && o.owner_id == owner)
            .cloned())
    }
}
