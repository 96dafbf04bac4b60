//! Request payloads.
//!
//! Identifiers arrive as strings and are parsed in the handlers so that a
//! malformed id is a 400, not a deserialization failure. Prices are never
//! part of any request payload.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderBody {
    pub items: Vec<CartItemBody>,
    pub shipping_address_id: String,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemBody {
    pub product_id: String,
    pub quantity: u32,
}
