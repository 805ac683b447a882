//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PixelConfig;
use crate::db::Store;
use crate::services::JwtManager;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the data store and
/// the token manager.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PixelConfig,
    store: Arc<dyn Store>,
    jwt: JwtManager,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Data store (`PgStore` in production, `MemoryStore` in tests)
    #[must_use]
    pub fn new(config: PixelConfig, store: Arc<dyn Store>) -> Self {
        let jwt = JwtManager::from_config(&config.jwt);

        Self {
            inner: Arc::new(AppStateInner { config, store, jwt }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &PixelConfig {
        &self.inner.config
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token manager.
    #[must_use]
    pub fn jwt(&self) -> &JwtManager {
        &self.inner.jwt
    }
}
