//! Canteen backend API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - Plain REST/JSON over `reqwest`; per-user bearer tokens from the
//!   session context on every authenticated call
//! - In-memory caching via `moka` for the menu (5 minute TTL)
//!
//! The error type deliberately keeps transport failures ([`CanteenError::Http`])
//! apart from explicit rejections ([`CanteenError::Api`]): the payment
//! verifier maps the former to an ambiguous-outcome network error and the
//! latter to a definitive verification failure, and must never confuse
//! the two.
//!
//! # Example
//!
//! ```rust,ignore
//! use tiffin_storefront::canteen::CanteenClient;
//!
//! let client = CanteenClient::new(&config.canteen);
//!
//! // Log in and fetch the cart
//! let login = client.login("asha@example.com", "...").await?;
//! let cart = client.cart(&ctx).await?;
//! ```

mod client;
mod conversions;
pub mod types;

pub use client::CanteenClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the canteen backend.
#[derive(Debug, Error)]
pub enum CanteenError {
    /// HTTP transport failed; the outcome of the request is unknown.
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

impl CanteenError {
    /// Whether the request may or may not have reached the backend.
    ///
    /// Transport failures are the only errors with an ambiguous outcome;
    /// everything else is a definitive answer from the backend.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Whether the request's side effects may have landed anyway.
    ///
    /// Covers transport failures and backend 5xx responses: a verify
    /// call answered with 500 may still have finalized the order, so the
    /// caller must reconcile instead of treating it as a rejection.
    #[must_use]
    pub const fn is_ambiguous_outcome(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { status: 500.., .. })
    }
}
