//! Checkout pricing rules.
//!
//! The storefront charges a flat 8% tax and flat-rate shipping that is
//! waived once the subtotal reaches the free-shipping threshold. All money
//! values are [`Decimal`] and every figure stored on an order is rescaled to
//! two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Flat tax rate applied to every order (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Round a money amount to two decimal places, half away from zero.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Line total for a cart or order line at a given unit price.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round2(unit_price * Decimal::from(quantity))
}

/// The four figures frozen onto an order header at placement time.
///
/// `total = subtotal + tax + shipping` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute tax, shipping, and total from a subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let subtotal = round2(subtotal);
        let tax = round2(subtotal * TAX_RATE);
        let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD {
            round2(Decimal::ZERO)
        } else {
            round2(FLAT_SHIPPING_RATE)
        };
        let total = round2(subtotal + tax + shipping);

        Self {
            subtotal,
            tax,
            shipping,
            total,
        }
    }
}
