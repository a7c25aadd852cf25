//! Dealer (wholesale) discounts

use crate::domain::value_objects::Percent;

/// Default discount a dealer tier confers. Unknown tiers get nothing.
pub fn tier_default_discount(tier: i32) -> Percent {
    match tier {
        1 => Percent::from_whole(5),
        2 => Percent::from_whole(10),
        3 => Percent::from_whole(15),
        4 => Percent::from_whole(20),
        _ => Percent::ZERO,
    }
}

/// The larger of the tier default and the customer's own override.
/// An override can raise a dealer's discount but never lower it.
pub fn effective_dealer_discount(tier: i32, customer_override: Percent) -> Percent {
    tier_default_discount(tier).max(customer_override)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_override_never_lowers_tier_default() {
        assert_eq!(effective_dealer_discount(2, Percent::from_whole(5)), Percent::from_whole(10));
        assert_eq!(effective_dealer_discount(2, Percent::from_whole(15)), Percent::from_whole(15));
        assert_eq!(effective_dealer_discount(9, Percent::from_whole(3)), Percent::from_whole(3));
    }

    #[test]
    fn test_monotonic_in_override() {
        for tier in -1..=5 {
            let mut previous = Percent::ZERO;
            for step in 0..=200 {
                let value = Percent::clamped(Decimal::new(step, 0) / Decimal::TWO);
                let effective = effective_dealer_discount(tier, value);
                assert!(effective >= previous, "tier {tier} at {value}");
                assert!(effective >= tier_default_discount(tier));
                previous = effective;
            }
        }
    }
}
