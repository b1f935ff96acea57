//! Application state shared across handlers.

use std::sync::Arc;

use crate::commerce::{CommerceClient, CommerceError};
use crate::config::StorefrontConfig;
use crate::services::CartSync;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the commerce API client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    commerce: CommerceClient,
    cart_sync: CartSync,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CommerceError> {
        let commerce = CommerceClient::new(&config.commerce)?;
        let cart_sync = CartSync::new(commerce.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                commerce,
                cart_sync,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce API client.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient {
        &self.inner.commerce
    }

    /// Get a reference to the cart sync service.
    #[must_use]
    pub fn cart_sync(&self) -> &CartSync {
        &self.inner.cart_sync
    }
}
