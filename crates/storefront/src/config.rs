//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CANTEEN_API_URL` - Base URL of the canteen backend REST API
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: http://localhost:3000)
//! - `CHECKOUT_SCRIPT_URL` - Payment widget script the checkout page loads
//! - `CHECKOUT_CAPTURE_TIMEOUT_SECS` - Deadline for a payment widget
//!   session before the checkout is considered timed out (default: 900)
//! - `CHECKOUT_VERIFY_ATTEMPTS` - Verification attempts on transport
//!   failure, all under one idempotency key (default: 3)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default payment widget script (Razorpay hosted checkout).
const DEFAULT_CHECKOUT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Canteen backend API configuration
    pub canteen: CanteenApiConfig,
    /// Checkout workflow configuration
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Canteen backend API configuration.
#[derive(Debug, Clone)]
pub struct CanteenApiConfig {
    /// Base URL of the backend REST API
    pub base_url: Url,
}

/// Checkout workflow configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Payment widget script URL handed to the checkout page
    pub widget_script_url: String,
    /// How long a capture session may stay open before timing out
    pub capture_timeout: Duration,
    /// Verification attempts on transport failure (same idempotency key)
    pub verify_attempts: u32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");

        let canteen = CanteenApiConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            canteen,
            checkout,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CanteenApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("CANTEEN_API_URL")?;
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("CANTEEN_API_URL".to_string(), e.to_string()))?;
        Ok(Self { base_url })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = get_env_or_default("CHECKOUT_CAPTURE_TIMEOUT_SECS", "900")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CHECKOUT_CAPTURE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let verify_attempts = get_env_or_default("CHECKOUT_VERIFY_ATTEMPTS", "3")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CHECKOUT_VERIFY_ATTEMPTS".to_string(), e.to_string())
            })?;
        if verify_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_VERIFY_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            widget_script_url: get_env_or_default("CHECKOUT_SCRIPT_URL", DEFAULT_CHECKOUT_SCRIPT_URL),
            capture_timeout: Duration::from_secs(timeout_secs),
            verify_attempts,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            canteen: CanteenApiConfig {
                base_url: Url::parse("http://localhost:8080").unwrap(),
            },
            checkout: CheckoutConfig {
                widget_script_url: DEFAULT_CHECKOUT_SCRIPT_URL.to_string(),
                capture_timeout: Duration::from_secs(900),
                verify_attempts: 3,
            },
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_default_widget_script_is_https() {
        let config = test_config();
        assert!(config.checkout.widget_script_url.starts_with("https://"));
    }
}
