use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use pawmart_accounts::AddressSnapshot;
use pawmart_core::{DomainError, Money, OrderId, ProductId, UserId};

use crate::error::PlaceOrderError;
use crate::pricing::ResolvedLine;

/// Accepted payment methods (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PlaceOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(PlaceOrderError::InvalidPaymentMethod(other.to_string())),
        }
    }
}

/// Order status lifecycle.
///
/// Placement only ever writes `Pending`; the later transitions belong to
/// order management and never pass through the checkout path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// A durable order line: product reference plus name/price snapshots.
///
/// `product_id` is a soft reference; the product may later be deleted or
/// deactivated without invalidating order history, which is why the name
/// and unit price are copied in at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl From<ResolvedLine> for OrderLine {
    fn from(value: ResolvedLine) -> Self {
        Self {
            product_id: value.product_id,
            product_name: value.product_name,
            unit_price: value.unit_price,
            quantity: value.quantity,
            line_total: value.line_total,
        }
    }
}

/// A durable order. Created exactly once per successful placement and never
/// mutated by the checkout path afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub owner_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    pub shipping_address: AddressSnapshot,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Assemble a new `Pending` order from resolved lines.
    ///
    /// The total is computed here, from the lines, with checked arithmetic;
    /// it is never accepted from outside, so `total == sum(line_total)`
    /// holds for every order this function returns.
    pub fn assemble(
        owner_id: UserId,
        lines: Vec<ResolvedLine>,
        shipping_address: AddressSnapshot,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Order, PlaceOrderError> {
        let total = Money::checked_sum(lines.iter().map(|l| l.line_total))?;

        let id = OrderId::new();
        let created_at = Utc::now();

        Ok(Order {
            id,
            order_number: generate_order_number(id, created_at),
            owner_id,
            status: OrderStatus::Pending,
            total,
            shipping_address,
            payment_method,
            notes,
            created_at,
            lines: lines.into_iter().map(OrderLine::from).collect(),
        })
    }
}

/// Generate the human-facing order number.
///
/// Millisecond timestamp plus the random tail of the order's UUIDv7: the
/// prefix keeps numbers time-ordered, the 32 random bits make a collision
/// within the same millisecond negligible.
pub fn generate_order_number(id: OrderId, at: DateTime<Utc>) -> String {
    let simple = id.as_uuid().simple().to_string();
    // Last 8 hex chars of a UUIDv7 are part of its random section.
    let suffix = &simple[simple.len() - 8..];
    format!("ORD-{}-{}", at.timestamp_millis(), suffix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AddressSnapshot {
        AddressSnapshot {
            full_name: "Ada Yilmaz".to_string(),
            phone: "+905551112233".to_string(),
            address: "Bahar Sk. 12/3".to_string(),
            city: "Istanbul".to_string(),
            district: "Kadikoy".to_string(),
            postal_code: "34710".to_string(),
        }
    }

    fn resolved(price: u64, quantity: u32) -> ResolvedLine {
        ResolvedLine {
            product_id: ProductId::new(),
            product_name: "Bird Cage".to_string(),
            unit_price: Money::from_minor(price),
            quantity,
            line_total: Money::from_minor(price).checked_mul(quantity).unwrap(),
        }
    }

    #[test]
    fn total_equals_sum_of_line_totals() {
        let order = Order::assemble(
            UserId::new(),
            vec![resolved(4500, 2), resolved(1200, 3)],
            snapshot(),
            PaymentMethod::Card,
            None,
        )
        .unwrap();

        let expected = Money::checked_sum(order.lines.iter().map(|l| l.line_total)).unwrap();
        assert_eq!(order.total, expected);
        assert_eq!(order.total, Money::from_minor(9000 + 3600));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn order_numbers_carry_prefix_and_differ_per_order() {
        let at = Utc::now();
        let a = generate_order_number(OrderId::new(), at);
        let b = generate_order_number(OrderId::new(), at);

        assert!(a.starts_with("ORD-"));
        assert_ne!(a, b);
    }

    #[test]
    fn payment_method_parses_the_closed_set_only() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(
            "bank_transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(
            err,
            PlaceOrderError::InvalidPaymentMethod("bitcoin".to_string())
        );
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
