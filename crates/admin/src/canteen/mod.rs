//! Canteen backend API client for staff operations.
//!
//! Same backend as the storefront talks to, but this client only exposes
//! the staff surface: login plus the `/admin` order endpoints. The
//! backend enforces the admin role on its side; the panel enforces it
//! again at login so user accounts never get a staff session.

mod client;

pub use client::AdminCanteenClient;

use thiserror::Error;

/// Errors that can occur when talking to the canteen backend.
#[derive(Debug, Error)]
pub enum AdminCanteenError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the request.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The bearer token was missing, invalid, or expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend sent a payload the client cannot interpret.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdminCanteenError::Api {
            status: 403,
            message: "Access denied".to_string(),
        };
        assert_eq!(err.to_string(), "API error (403): Access denied");
    }
}
