//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::db::CustomerStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// customer store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    store: Arc<dyn CustomerStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Portal configuration
    /// * `store` - Customer record store (`PostgreSQL` or in-memory)
    #[must_use]
    pub fn new(config: PortalConfig, store: Arc<dyn CustomerStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the customer store.
    #[must_use]
    pub fn store(&self) -> &dyn CustomerStore {
        self.inner.store.as_ref()
    }
}
