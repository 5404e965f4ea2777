//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Responses are JSON `{"error": "..."}` bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::canteen::CanteenError;
use crate::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Canteen backend API operation failed.
    #[error("Canteen API error: {0}")]
    Canteen(#[from] CanteenError),

    /// Checkout workflow failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is worth a Sentry event.
    ///
    /// Definitive rejections (bad credentials, empty cart, replayed
    /// capture) are normal traffic; transport failures and upstream
    /// breakage are not.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Canteen(err) => !matches!(
                err,
                CanteenError::Unauthorized(_) | CanteenError::NotFound(_)
            ),
            Self::Checkout(err) => matches!(
                err,
                CheckoutError::Upstream(_) | CheckoutError::Network(_) | CheckoutError::SdkLoad
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Canteen(err) => canteen_status(err),
            Self::Checkout(err) => checkout_status(err),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Canteen(err) => match err {
                CanteenError::Unauthorized(_) => "Invalid credentials or expired session".to_string(),
                CanteenError::NotFound(msg) => msg.clone(),
                // Backend rejections carry user-facing messages
                CanteenError::Api { message, .. } => message.clone(),
                CanteenError::Http(_) | CanteenError::Parse(_) | CanteenError::InvalidPayload(_) => {
                    "Canteen service error".to_string()
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::Upstream(_) | CheckoutError::Network(_) => {
                    "Checkout service error".to_string()
                }
                other => other.to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn canteen_status(err: &CanteenError) -> StatusCode {
    match err {
        CanteenError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        CanteenError::NotFound(_) => StatusCode::NOT_FOUND,
        // Backend 4xx rejections pass through; everything else is the
        // upstream's fault from the client's point of view.
        CanteenError::Api { status, .. } => StatusCode::from_u16(*status)
            .ok()
            .filter(StatusCode::is_client_error)
            .unwrap_or(StatusCode::BAD_GATEWAY),
        CanteenError::Http(_) | CanteenError::Parse(_) | CanteenError::InvalidPayload(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
        CheckoutError::Unauthorized => StatusCode::UNAUTHORIZED,
        CheckoutError::CheckoutInFlight | CheckoutError::Capture(_) => StatusCode::CONFLICT,
        CheckoutError::Verification(_) => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::SdkLoad
        | CheckoutError::Upstream(_)
        | CheckoutError::Network(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::SubmitError;
    use tiffin_core::OrderId;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_error_status_codes() {
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::CheckoutInFlight)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::Verification(
                "signature mismatch".to_string()
            ))),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::Capture(
                SubmitError::UnknownSession(OrderId::new("o1"))
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_backend_client_rejections_pass_through() {
        let err = AppError::Canteen(CanteenError::Api {
            status: 400,
            message: "Quantity exceeds available stock".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);

        let err = AppError::Canteen(CanteenError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }
}
