//! HTTP error mapping

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use crate::domain::aggregates::{CartError, CouponError, OrderError, ProductError};
use crate::pricing::QuoteError;
use crate::EcommerceError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(#[from] EcommerceError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Domain(e) => match e {
                EcommerceError::ProductNotFound(_)
                | EcommerceError::PlatformNotFound(_)
                | EcommerceError::OrderNotFound
                | EcommerceError::NoPaymentToken => StatusCode::NOT_FOUND,
                EcommerceError::DuplicateCoupon(_) => StatusCode::CONFLICT,
                EcommerceError::CorruptRow { .. } | EcommerceError::StorageError(_) | EcommerceError::Crypto(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Internal failures get a generic message; the detail only goes to the log.
    pub fn response_message(&self) -> String {
        if self.status_code().is_server_error() { "Internal server error".to_string() } else { self.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

macro_rules! validation_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ApiError {
            fn from(err: $ty) -> Self { Self::Validation(err.to_string()) }
        })*
    };
}

validation_from!(CartError, CouponError, OrderError, ProductError, QuoteError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(EcommerceError::DuplicateCoupon("X".into())).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(EcommerceError::NoPaymentToken).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(CartError::InvalidQuantity(3)).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(EcommerceError::CorruptRow { table: "coupons", id: "4".into(), reason: "bad type".into() });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), "Internal server error");
        assert_eq!(ApiError::NotFound("Platform 'fox' not found".into()).response_message(), "Platform 'fox' not found");
    }
}
