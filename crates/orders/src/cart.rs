//! Client-submitted cart lines and demand aggregation.

use serde::{Deserialize, Serialize};

use pawmart_core::ProductId;

use crate::error::PlaceOrderError;

/// A client-submitted (product, quantity) pair.
///
/// Untrusted input: it never carries a price or a name, and the quantity is
/// validated before anything else happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Total requested quantity for one product across all lines of one cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartDemand {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Collapse cart lines into per-product aggregated demand.
///
/// Duplicate `product_id` entries are cumulative: two lines for the same
/// product must be checked against stock as one total, otherwise both lines
/// could pass an individual check and double-spend the same units. Products
/// keep their first-appearance order.
pub fn aggregate_demand(lines: &[CartLine]) -> Result<Vec<CartDemand>, PlaceOrderError> {
    if lines.is_empty() {
        return Err(PlaceOrderError::InvalidCart(
            "cart must contain at least one line".to_string(),
        ));
    }

    let mut demand: Vec<CartDemand> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(PlaceOrderError::InvalidCart(format!(
                "quantity for product {} must be positive",
                line.product_id
            )));
        }

        if let Some(idx) = demand.iter().position(|d| d.product_id == line.product_id) {
            let existing = &mut demand[idx];
            existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                PlaceOrderError::InvalidCart(format!(
                    "aggregated quantity for product {} overflows",
                    line.product_id
                ))
            })?;
        } else {
            demand.push(CartDemand {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
    }

    Ok(demand)
}
