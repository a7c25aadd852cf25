//! Product Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{CategoryIds, Money};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub part_number: String,
    pub name: String,
    pub price: Money,
    pub platform_id: Option<i64>,
    pub category_ids: CategoryIds,
    pub display: bool,
}

impl Product {
    pub fn is_in_category(&self, category_id: i64) -> bool { self.category_ids.contains(category_id) }

    /// Visible on the storefront and built for the given platform.
    pub fn fits(&self, platform_id: i64) -> bool { self.display && self.platform_id == Some(platform_id) }

    pub fn ensure_purchasable(&self) -> Result<(), ProductError> {
        if !self.display { return Err(ProductError::NotForSale(self.id)); }
        if self.price.is_negative() { return Err(ProductError::InvalidPrice(self.id)); }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Product {0} is not available for sale")]
    NotForSale(i64),
    #[error("Product {0} has an invalid price")]
    InvalidPrice(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coilover() -> Product {
        Product {
            id: 7, part_number: "CO-S197".into(), name: "Coilover Kit".into(), price: Money::usd(dec!(1299.00)),
            platform_id: Some(3), category_ids: CategoryIds::parse("3,12"), display: true,
        }
    }

    #[test]
    fn test_category_membership_is_set_based() {
        let p = coilover();
        assert!(p.is_in_category(12));
        assert!(p.is_in_category(3));
        assert!(!p.is_in_category(1));
        assert!(!p.is_in_category(2));
    }

    #[test]
    fn test_fits_requires_display_and_platform() {
        let mut p = coilover();
        assert!(p.fits(3));
        assert!(!p.fits(4));
        p.display = false;
        assert!(!p.fits(3));
        assert_eq!(p.ensure_purchasable(), Err(ProductError::NotForSale(7)));
    }
}
