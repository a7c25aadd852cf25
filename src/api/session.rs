//! Bearer-token sessions issued by the auth provider.
//!
//! We only verify them. Claims carry what pricing needs:
//! `{sub, role, dealer_tier, dealer_discount, exp}`.

use axum::{async_trait, extract::FromRequestParts, http::{header::AUTHORIZATION, request::Parts}};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{Customer, Role};
use crate::domain::value_objects::Percent;
use super::{error::ApiError, AppState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    #[serde(default)]
    pub dealer_tier: Option<i32>,
    #[serde(default)]
    pub dealer_discount: Option<Decimal>,
    pub exp: usize,
}

#[derive(Clone)]
pub struct SessionKeys {
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self { Self { decoding: DecodingKey::from_secret(secret) } }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                ApiError::Unauthorized("Invalid or expired session".to_string())
            })
    }
}

/// A verified session.
#[derive(Debug, Clone)]
pub struct Session(pub Claims);

impl Session {
    pub fn customer_id(&self) -> i64 { self.0.sub }

    pub fn customer(&self) -> Customer {
        Customer {
            id: Some(self.0.sub),
            role: self.0.role,
            dealer_tier: self.0.dealer_tier,
            dealer_discount: self.0.dealer_discount.map(Percent::clamped),
        }
    }
}

/// Guest-friendly variant: no header means no session, a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

/// A session whose role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

fn bearer(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else { return Ok(None) };
    let value = value.to_str().map_err(|_| ApiError::Unauthorized("Malformed authorization header".to_string()))?;
    value.strip_prefix("Bearer ")
        .map(|t| Some(t.trim()))
        .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer(parts)? {
            Some(token) => Ok(Self(Some(Session(state.sessions.verify(token)?)))),
            None => Ok(Self(None)),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
        session.ok_or_else(|| ApiError::Unauthorized("Sign in required".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.0.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &[u8], exp: usize) -> String {
        let claims = Claims { sub: 12, role: Role::Dealer, dealer_tier: Some(2), dealer_discount: Some(Decimal::new(125, 1)), exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn far_future() -> usize { (chrono::Utc::now().timestamp() + 3600) as usize }

    #[test]
    fn test_verify_round_trip_to_customer() {
        let keys = SessionKeys::from_secret(b"s3cret");
        let session = Session(keys.verify(&token(b"s3cret", far_future())).unwrap());
        let customer = session.customer();
        assert_eq!(customer.id, Some(12));
        assert_eq!(customer.role, Role::Dealer);
        // 12.5% override beats the 10% tier-2 default
        assert_eq!(customer.dealer_discount().value(), Decimal::new(125, 1));
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let keys = SessionKeys::from_secret(b"s3cret");
        assert!(matches!(keys.verify(&token(b"other", far_future())), Err(ApiError::Unauthorized(_))));
        assert!(matches!(keys.verify(&token(b"s3cret", 1_000)), Err(ApiError::Unauthorized(_))));
    }
}
