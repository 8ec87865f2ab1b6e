//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::{CartRepository, ProductRepository, Stores};
use crate::events::EventBus;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands each handler the
/// collection managers it needs; nothing is reached through globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: ProductRepository,
    carts: CartRepository,
    events: EventBus,
}

impl AppState {
    /// Create a new application state over already opened stores.
    #[must_use]
    pub fn new(config: StorefrontConfig, stores: Stores) -> Self {
        let products = ProductRepository::new(stores.products.clone());
        let carts = CartRepository::new(stores.carts, stores.products);
        let events = EventBus::new(config.event_capacity);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                carts,
                events,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the product collection manager.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Get the cart collection manager.
    #[must_use]
    pub fn carts(&self) -> &CartRepository {
        &self.inner.carts
    }

    /// Get the live product event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }
}
