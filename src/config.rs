//! Runtime configuration, read from the environment (and `.env` via dotenvy in `main`).

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use crate::domain::value_objects::Money;
use crate::pricing::ShippingRates;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_GROUND_RATE: &str = "15.00";
const DEFAULT_FREIGHT_RATE: &str = "150.00";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub nats_url: Option<String>,
    pub session_secret: String,
    /// Base64, 32 bytes.
    pub payment_token_key: String,
    pub shipping_rates: ShippingRates,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, so tests don't have to touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| lookup(name).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string());

        let port = parse_value("PORT", &or_default("PORT", &DEFAULT_PORT.to_string()))?;
        let max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &or_default("DATABASE_MAX_CONNECTIONS", &DEFAULT_MAX_CONNECTIONS.to_string()))?;
        let ground: Decimal = parse_value("GROUND_SHIPPING_RATE", &or_default("GROUND_SHIPPING_RATE", DEFAULT_GROUND_RATE))?;
        let freight: Decimal = parse_value("FREIGHT_SHIPPING_RATE", &or_default("FREIGHT_SHIPPING_RATE", DEFAULT_FREIGHT_RATE))?;
        for (name, rate) in [("GROUND_SHIPPING_RATE", ground), ("FREIGHT_SHIPPING_RATE", freight)] {
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(ConfigError::Invalid { name, value: rate.to_string() });
            }
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            max_connections,
            nats_url: lookup("NATS_URL").filter(|v| !v.trim().is_empty()),
            session_secret: required("SESSION_SECRET")?,
            payment_token_key: required("PAYMENT_TOKEN_KEY")?,
            shipping_rates: ShippingRates { ground: Money::usd(ground), freight: Money::usd(freight) },
        })
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid { name, value: value.to_string() })
}
