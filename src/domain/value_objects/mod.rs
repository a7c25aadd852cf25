//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Sub};

/// Money value object. The storefront only sells in USD, so the currency is implied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn usd(amount: Decimal) -> Self { Self(amount) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn is_negative(&self) -> bool { self.0.is_sign_negative() && !self.0.is_zero() }

    /// Rounds half away from zero to whole cents.
    pub fn round_cents(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn multiply(&self, qty: u32) -> Money { Money(self.0 * Decimal::from(qty)) }

    /// `self * pct / 100`, rounded to cents.
    pub fn percent_of(&self, pct: Percent) -> Money {
        Money(self.0 * pct.value() / Decimal::ONE_HUNDRED).round_cents()
    }

    /// `self * (1 - pct / 100)`, rounded to cents.
    pub fn less_percent(&self, pct: Percent) -> Money {
        Money(self.0 * (Decimal::ONE_HUNDRED - pct.value()) / Decimal::ONE_HUNDRED).round_cents()
    }

    pub fn saturating_sub(self, other: Money) -> Money {
        if other.0 >= self.0 { Money::ZERO } else { Money(self.0 - other.0) }
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money { Money(self.0 + rhs.0) }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money { Money(self.0 - rhs.0) }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money { iter.fold(Money::ZERO, |a, b| a + b) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "${:.2}", self.0) }
}

/// Percentage in the range 0..=100
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, PercentError> {
        if value.is_sign_negative() && !value.is_zero() { return Err(PercentError::Negative); }
        if value > Decimal::ONE_HUNDRED { return Err(PercentError::OverHundred); }
        Ok(Self(value))
    }

    /// Clamps out-of-range values into 0..=100. Used for stored values we don't reject.
    pub fn clamped(value: Decimal) -> Self {
        Self(value.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED))
    }

    pub fn from_whole(value: u32) -> Self { Self::clamped(Decimal::from(value)) }
    pub fn value(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
}

impl TryFrom<Decimal> for Percent {
    type Error = PercentError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Percent::new(value) }
}

impl From<Percent> for Decimal {
    fn from(p: Percent) -> Decimal { p.0 }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}%", self.0.normalize()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentError {
    #[error("percentage cannot be negative")]
    Negative,
    #[error("percentage cannot exceed 100")]
    OverHundred,
}

/// Set of category ids a product belongs to.
///
/// Legacy catalog exports store membership as a delimited string (`"3,7, 12"`);
/// [`CategoryIds::parse`] accepts that encoding so membership is always checked
/// against the set, never by comparing the raw string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIds(BTreeSet<i64>);

impl CategoryIds {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split(',').filter_map(|t| t.trim().parse::<i64>().ok()).collect())
    }

    pub fn contains(&self, category_id: i64) -> bool { self.0.contains(&category_id) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ { self.0.iter().copied() }
}

impl FromIterator<i64> for CategoryIds {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self { Self(iter.into_iter().collect()) }
}

impl fmt::Display for CategoryIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(i64::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// How a request names a platform: numeric id or URL slug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformRef {
    Id(i64),
    Slug(String),
}

impl PlatformRef {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() { return None; }
        match raw.parse::<i64>() {
            Ok(id) => Some(Self::Id(id)),
            Err(_) => Some(Self::Slug(raw.to_lowercase())),
        }
    }
}

impl fmt::Display for PlatformRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Id(id) => write!(f, "{}", id), Self::Slug(s) => write!(f, "{}", s) }
    }
}

/// US state or territory, as found in a shipping address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UsState { code: &'static str, name: &'static str }

const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"), ("AK", "Alaska"), ("AZ", "Arizona"), ("AR", "Arkansas"), ("CA", "California"),
    ("CO", "Colorado"), ("CT", "Connecticut"), ("DE", "Delaware"), ("DC", "District of Columbia"),
    ("FL", "Florida"), ("GA", "Georgia"), ("HI", "Hawaii"), ("ID", "Idaho"), ("IL", "Illinois"),
    ("IN", "Indiana"), ("IA", "Iowa"), ("KS", "Kansas"), ("KY", "Kentucky"), ("LA", "Louisiana"),
    ("ME", "Maine"), ("MD", "Maryland"), ("MA", "Massachusetts"), ("MI", "Michigan"), ("MN", "Minnesota"),
    ("MS", "Mississippi"), ("MO", "Missouri"), ("MT", "Montana"), ("NE", "Nebraska"), ("NV", "Nevada"),
    ("NH", "New Hampshire"), ("NJ", "New Jersey"), ("NM", "New Mexico"), ("NY", "New York"),
    ("NC", "North Carolina"), ("ND", "North Dakota"), ("OH", "Ohio"), ("OK", "Oklahoma"), ("OR", "Oregon"),
    ("PA", "Pennsylvania"), ("RI", "Rhode Island"), ("SC", "South Carolina"), ("SD", "South Dakota"),
    ("TN", "Tennessee"), ("TX", "Texas"), ("UT", "Utah"), ("VT", "Vermont"), ("VA", "Virginia"),
    ("WA", "Washington"), ("WV", "West Virginia"), ("WI", "Wisconsin"), ("WY", "Wyoming"),
    ("PR", "Puerto Rico"), ("GU", "Guam"), ("VI", "U.S. Virgin Islands"), ("AS", "American Samoa"),
    ("MP", "Northern Mariana Islands"),
];

const NAME_ALIASES: &[(&str, &str)] = &[
    ("Virgin Islands", "VI"), ("US Virgin Islands", "VI"), ("Washington DC", "DC"), ("Washington D.C.", "DC"),
];

impl UsState {
    /// Looks up a state by two-letter code or full name, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() { return None; }
        let code = NAME_ALIASES.iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(raw))
            .map(|(_, code)| *code)
            .unwrap_or(raw);
        US_STATES.iter()
            .find(|(c, n)| c.eq_ignore_ascii_case(code) || n.eq_ignore_ascii_case(code))
            .map(|(code, name)| Self { code, name })
    }

    pub fn code(&self) -> &'static str { self.code }
    pub fn name(&self) -> &'static str { self.name }
}

impl fmt::Display for UsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.code) }
}
