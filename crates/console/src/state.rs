//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::ConsoleConfig;

/// Application state shared across all handlers.
///
/// Holds the two pieces of process-wide mutable state the console has -
/// the backend client (with its token slot) and the query cache - plus the
/// immutable configuration. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ConsoleConfig,
    api: ApiClient,
    cache: QueryCache,
}

impl AppState {
    /// Build the state from configuration.
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        let api = ApiClient::new(config.backend_url.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cache: QueryCache::new(),
            }),
        }
    }

    /// Console configuration.
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// Backend REST client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }
}
