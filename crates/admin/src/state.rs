//! Application state shared across handlers.

use std::sync::Arc;

use crate::canteen::AdminCanteenClient;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    canteen: AdminCanteenClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let canteen = AdminCanteenClient::new(&config);

        Self {
            inner: Arc::new(AppStateInner { config, canteen }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the staff API client.
    #[must_use]
    pub fn canteen(&self) -> &AdminCanteenClient {
        &self.inner.canteen
    }
}
