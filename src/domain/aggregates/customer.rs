//! Customer Aggregate

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::domain::value_objects::Percent;
use crate::pricing::dealer::effective_dealer_discount;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Dealer,
    Admin,
}

impl Role {
    /// Roles that buy at dealer prices.
    pub fn gets_dealer_pricing(&self) -> bool { matches!(self, Self::Dealer | Self::Admin) }
}

impl FromStr for Role {
    type Err = UnknownRole;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "dealer" => Ok(Self::Dealer),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The pricing-relevant view of a customer, whether loaded from the database or a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Option<i64>,
    pub role: Role,
    pub dealer_tier: Option<i32>,
    pub dealer_discount: Option<Percent>,
}

impl Customer {
    pub fn guest() -> Self { Self::default() }

    /// Discount applied to every unit price before coupons. Zero for retail customers.
    pub fn dealer_discount(&self) -> Percent {
        if !self.role.gets_dealer_pricing() { return Percent::ZERO; }
        effective_dealer_discount(self.dealer_tier.unwrap_or(0), self.dealer_discount.unwrap_or(Percent::ZERO))
    }
}
