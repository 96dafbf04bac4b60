use serde::{Deserialize, Serialize};

use pawmart_core::{AddressId, UserId};

/// A shipping address in an account's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub owner_id: UserId,
    pub title: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub postal_code: String,
    pub is_default: bool,
}

impl Address {
    pub fn is_owned_by(&self, owner: UserId) -> bool {
        self.owner_id == owner
    }
}

/// The address copy frozen into an order at commit time.
///
/// Later edits to the address book must not change past orders, so the
/// snapshot carries the full delivery details by value and drops the
/// address-book identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub postal_code: String,
}

impl From<&Address> for AddressSnapshot {
    fn from(value: &Address) -> Self {
        Self {
            full_name: value.full_name.clone(),
            phone: value.phone.clone(),
            address: value.address.clone(),
            city: value.city.clone(),
            district: value.district.clone(),
            postal_code: value.postal_code.clone(),
        }
    }
}
