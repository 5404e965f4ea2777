//! Application state shared across handlers.

use std::sync::Arc;

use crate::canteen::CanteenClient;
use crate::checkout::CheckoutService;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the checkout service, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    canteen: CanteenClient,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let canteen = CanteenClient::new(&config.canteen);
        let checkout = CheckoutService::new(canteen.clone(), &config.checkout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                canteen,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the canteen backend API client.
    #[must_use]
    pub fn canteen(&self) -> &CanteenClient {
        &self.inner.canteen
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
