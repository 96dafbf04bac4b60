//! Authoritative pricing of aggregated cart demand.

use pawmart_catalog::Product;
use pawmart_core::{Money, ProductId};

use crate::cart::CartDemand;
use crate::error::PlaceOrderError;

/// A cart line after authoritative pricing from the catalog.
///
/// Exists only for the duration of one placement attempt. The unit price and
/// name come from the catalog row fetched at placement time, never from the
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl ResolvedLine {
    /// Price one product's aggregated demand against its live catalog row.
    ///
    /// Rejects inactive products and demand exceeding the current stock.
    /// The stock check here is advisory; the commit re-validates it with a
    /// conditional decrement, which is what makes concurrent checkouts safe.
    pub fn resolve(product: &Product, demand: CartDemand) -> Result<ResolvedLine, PlaceOrderError> {
        debug_assert_eq!(product.id, demand.product_id);

        if !product.can_be_sold() {
            return Err(PlaceOrderError::ProductUnavailable(product.id));
        }

        if !product.has_stock_for(demand.quantity) {
            return Err(PlaceOrderError::InsufficientStock {
                product_id: product.id,
                requested: demand.quantity,
                available: product.stock_quantity,
            });
        }

        let line_total = product.price.checked_mul(demand.quantity)?;

        Ok(ResolvedLine {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity: demand.quantity,
            line_total,
        })
    }
}
