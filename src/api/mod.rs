//! HTTP surface

use axum::{routing::{get, post}, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::crypto::PaymentTokenCipher;
use crate::domain::events::DomainEvent;
use crate::pricing::ShippingRates;
use crate::store::Store;

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod error;
pub mod session;

pub use error::ApiError;
pub use session::SessionKeys;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub nats: Option<async_nats::Client>,
    pub sessions: SessionKeys,
    pub cipher: PaymentTokenCipher,
    pub shipping_rates: ShippingRates,
}

impl AppState {
    /// Best effort: a failed publish is logged, never surfaced to the caller.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(nats) = &self.nats else { return };
        for event in events {
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => { tracing::warn!(error = %e, subject = event.subject(), "could not encode event"); continue; }
            };
            if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!(error = %e, subject = event.subject(), "could not publish event");
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "partsline-storefront"})) }))
        .route("/api/v1/validate-coupon", post(coupons::validate_coupon))
        .route("/api/v1/platforms", get(catalog::list_platforms))
        .route("/api/v1/platforms/lookup", get(catalog::lookup_vehicle))
        .route("/api/v1/platforms/:platform/main-categories", get(catalog::platform_main_categories))
        .route("/api/v1/platforms/:platform/categories", get(catalog::platform_categories))
        .route("/api/v1/platforms/:platform/products", get(catalog::platform_products))
        .route("/api/v1/checkout/quote", post(checkout::quote))
        .route("/api/v1/orders", post(checkout::place_order))
        .route("/api/v1/admin/coupons", get(admin::list_coupons).post(admin::create_coupon))
        .route("/api/v1/admin/coupons/deactivate-expired", post(admin::deactivate_expired_coupons))
        .route("/api/v1/admin/products/import", post(admin::import_products))
        .route("/api/v1/admin/orders/:id/payment-token", get(admin::reveal_payment_token))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
