//! Sales tax

use rust_decimal::Decimal;
use crate::domain::value_objects::{Money, UsState};

/// 7%, charged on every destination except the nexus-exempt state.
pub const SALES_TAX_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// Orders shipped here are not taxed.
pub const TAX_EXEMPT_STATE: &str = "FL";

pub fn is_tax_exempt(state: &str) -> bool {
    UsState::parse(state).is_some_and(|s| s.code() == TAX_EXEMPT_STATE)
}

pub fn tax_rate(state: &str) -> Decimal {
    if is_tax_exempt(state) { Decimal::ZERO } else { SALES_TAX_RATE }
}

/// `round((subtotal - discount) * rate, 2)`; a discount larger than the subtotal taxes nothing.
pub fn tax_amount(subtotal: Money, discount: Money, state: &str) -> Money {
    let taxable = subtotal.saturating_sub(discount);
    Money::usd(taxable.amount() * tax_rate(state)).round_cents()
}
