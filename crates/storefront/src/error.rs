//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All API handlers return
//! `Result<T, AppError>`; the body is always `{"status":"error","error":…}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use emporium_core::ValidationError;

use crate::db::{CartError, ProductError, StoreError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Input could not be turned into a valid document.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Product code already taken.
    #[error("a product with code {0:?} already exists")]
    DuplicateCode(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::DuplicateCode(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(e) => Self::Validation(e),
            ProductError::DuplicateCode(code) => Self::DuplicateCode(code),
            ProductError::Store(e) => Self::Storage(e),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::CartNotFound(id) => Self::NotFound(format!("Cart {id} not found")),
            CartError::Validation(e) => Self::Validation(e),
            CartError::Store(e) => Self::Storage(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "status": "error", "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::CartId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product 7 not found".to_string());
        assert_eq!(err.to_string(), "Product 7 not found");

        let err = AppError::Validation(ValidationError::MissingField("title"));
        assert_eq!(err.to_string(), "missing required field: title");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::DuplicateCode("C1".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationError::NotAnObject)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_cart_not_found_maps_to_404() {
        let err = AppError::from(CartError::CartNotFound(CartId::new(4)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Cart 4 not found");
    }

    #[tokio::test]
    async fn test_error_body_hides_storage_details() {
        let err = AppError::Storage(StoreError::Corrupt {
            collection: "products",
            reason: "expected value at line 1".to_string(),
        });

        let response = err.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            body,
            json!({ "status": "error", "error": "Internal server error" })
        );
    }
}
