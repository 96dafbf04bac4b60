//! Monetary amounts in minor currency units.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A monetary amount in the smallest currency unit (e.g. cents).
///
/// Amounts are never negative and all arithmetic is checked; an overflow
/// surfaces as a `DomainError` instead of wrapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from minor units (e.g. `from_minor(4500)` is 45.00).
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn minor(&self) -> u64 {
        self.0
    }

    /// Multiply by a quantity (line total = unit price * quantity).
    pub fn checked_mul(self, quantity: u32) -> Result<Money, DomainError> {
        self.0
            .checked_mul(u64::from(quantity))
            .map(Money)
            .ok_or_else(|| DomainError::validation("monetary amount overflow"))
    }

    pub fn checked_add(self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::validation("monetary amount overflow"))
    }

    /// Sum a sequence of amounts with overflow checking.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Result<Money, DomainError> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl core::fmt::Display for Money {
    /// Renders with two decimal places, e.g. `4500` -> `45.00`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_unit_price_times_quantity() {
        let unit = Money::from_minor(4500);
        assert_eq!(unit.checked_mul(2).unwrap(), Money::from_minor(9000));
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_minor(9000).to_string(), "90.00");
        assert_eq!(Money::from_minor(105).to_string(), "1.05");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
    }

    #[test]
    fn multiplication_overflow_is_an_error() {
        let err = Money::from_minor(u64::MAX).checked_mul(2).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn checked_sum_adds_all_amounts() {
        let total = Money::checked_sum([
            Money::from_minor(100),
            Money::from_minor(250),
            Money::from_minor(50),
        ])
        .unwrap();
        assert_eq!(total, Money::from_minor(400));
    }
}
