use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawmart_core::{Money, ProductId};

/// A catalog product as the checkout path sees it.
///
/// `price` and `name` are the authoritative values snapshotted into order
/// lines at commit time; a client-submitted price is never accepted.
/// `stock_quantity` is the only field the checkout path ever mutates, and
/// being unsigned it can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Check if the product can be sold (must be active).
    pub fn can_be_sold(&self) -> bool {
        self.is_active
    }

    /// Check if the product can cover a requested quantity.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock_quantity >= quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(stock: u32, active: bool) -> Product {
        Product {
            id: ProductId::new(),
            name: "Dog Bed".to_string(),
            description: None,
            price: Money::from_minor(4500),
            stock_quantity: stock,
            is_active: active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn inactive_product_cannot_be_sold() {
        assert!(!test_product(10, false).can_be_sold());
        assert!(test_product(10, true).can_be_sold());
    }

    #[test]
    fn stock_check_covers_exact_boundary() {
        let p = test_product(5, true);
        assert!(p.has_stock_for(5));
        assert!(!p.has_stock_for(6));
    }
}
