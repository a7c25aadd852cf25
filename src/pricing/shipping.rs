//! Shipping eligibility and charges

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, UsState};

/// Destinations outside the contiguous United States.
const NON_CONTIGUOUS: [&str; 7] = ["AK", "HI", "PR", "GU", "VI", "AS", "MP"];

/// False for Alaska, Hawaii and the territories (by code or full name), true otherwise.
pub fn is_lower_48_us_state(state: &str) -> bool {
    match UsState::parse(state) {
        Some(s) => !NON_CONTIGUOUS.contains(&s.code()),
        None => true,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    #[default]
    Ground,
    /// Truck freight; the carrier only serves the lower 48.
    Freight,
    Pickup,
}

impl ShippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Ground => "ground", Self::Freight => "freight", Self::Pickup => "pickup" }
    }

    /// Checks the method can deliver to `destination`, returning the parsed state when one is needed.
    /// Pickup never needs one.
    pub fn check_destination(&self, destination: Option<&str>) -> Result<Option<UsState>, ShippingError> {
        if *self == Self::Pickup { return Ok(None); }
        let raw = destination.map(str::trim).filter(|s| !s.is_empty()).ok_or(ShippingError::MissingDestination)?;
        let state = UsState::parse(raw).ok_or_else(|| ShippingError::UnknownState(raw.to_string()))?;
        if *self == Self::Freight && !is_lower_48_us_state(state.code()) {
            return Err(ShippingError::OutsideLower48(state.name().to_string()));
        }
        Ok(Some(state))
    }

    pub fn charge(&self, rates: &ShippingRates) -> Money {
        match self { Self::Ground => rates.ground, Self::Freight => rates.freight, Self::Pickup => Money::ZERO }
    }
}

/// Flat per-order rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShippingRates {
    pub ground: Money,
    pub freight: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShippingError {
    #[error("A shipping state is required for this shipping method")]
    MissingDestination,
    #[error("We only ship to US addresses; '{0}' is not a US state")]
    UnknownState(String),
    #[error("Freight shipping is only available in the lower 48 states, not {0}")]
    OutsideLower48(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_contiguous_destinations() {
        for s in ["AK", "HI", "PR", "GU", "VI", "AS", "MP", "alaska", "Hawaii", "Puerto Rico", "guam",
                  "U.S. Virgin Islands", "American Samoa", "Northern Mariana Islands"] {
            assert!(!is_lower_48_us_state(s), "{s}");
        }
    }

    #[test]
    fn test_everything_else_is_lower_48() {
        for s in ["FL", "GA", "CA", "Texas", "DC", "wa", "Maine", "Ontario", ""] {
            assert!(is_lower_48_us_state(s), "{s}");
        }
    }

    #[test]
    fn test_freight_requires_lower_48() {
        assert_eq!(ShippingMethod::Freight.check_destination(Some("HI")), Err(ShippingError::OutsideLower48("Hawaii".into())));
        assert!(ShippingMethod::Ground.check_destination(Some("HI")).is_ok());
        assert_eq!(ShippingMethod::Ground.check_destination(None), Err(ShippingError::MissingDestination));
        assert_eq!(ShippingMethod::Ground.check_destination(Some("Ontario")), Err(ShippingError::UnknownState("Ontario".into())));
        assert_eq!(ShippingMethod::Pickup.check_destination(None), Ok(None));
    }

    #[test]
    fn test_charges() {
        let rates = ShippingRates { ground: Money::usd(dec!(15)), freight: Money::usd(dec!(150)) };
        assert_eq!(ShippingMethod::Freight.charge(&rates).amount(), dec!(150));
        assert!(ShippingMethod::Pickup.charge(&rates).is_zero());
    }
}
