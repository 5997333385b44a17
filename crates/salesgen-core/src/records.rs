use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, NormalizedEmail};

/// Number of decimal places kept for money values.
pub const MONEY_SCALE: u32 = 2;

/// A purchasable product from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub unit_price: Decimal,
}

/// A synthesized customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: NormalizedEmail,
    pub country: String,
    pub state: String,
    pub city: String,
}

/// A single sale referencing one customer and one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Sale {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub customer_id: CustomerId,
    pub product_id: u32,
    pub quantity: u32,
    pub total: Decimal,
}

impl Sale {
    /// Build a sale, computing `total` from the product price.
    pub fn new(
        id: u64,
        timestamp: NaiveDateTime,
        customer_id: CustomerId,
        product: &Product,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            timestamp,
            customer_id,
            product_id: product.id,
            quantity,
            total: sale_total(product.unit_price, quantity),
        }
    }
}

/// `unit_price * quantity`, rounded half away from zero to two places.
pub fn sale_total(unit_price: Decimal, quantity: u32) -> Decimal {
    to_money(unit_price * Decimal::from(quantity))
}

/// Round to [`MONEY_SCALE`] places and pad the scale so values print as `12.50`.
pub fn to_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}
