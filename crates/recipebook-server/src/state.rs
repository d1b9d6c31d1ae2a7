//! Application state shared across handlers.

use std::sync::Arc;

use recipebook_search::FilterCompiler;
use recipebook_session::SessionStore;
use recipebook_store::Database;

use crate::config::ServerConfig;
use crate::ratelimit::{SharedRateLimiter, create_rate_limiter};

/// Session store backed by the catalog database.
pub type Sessions = SessionStore<Arc<Database>>;

/// Application state shared across all handlers.
///
/// Everything is constructed once at startup and handed in explicitly.
#[derive(Clone)]
pub struct AppState {
    /// Catalog, accounts and durable sessions.
    pub db: Arc<Database>,

    /// Two-tier session store.
    pub sessions: Sessions,

    /// Search query compiler.
    pub compiler: Arc<FilterCompiler>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// API rate limiter.
    pub limiter: SharedRateLimiter,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, sessions: Sessions, config: ServerConfig) -> Self {
        Self {
            db,
            sessions,
            compiler: Arc::new(FilterCompiler::new()),
            limiter: create_rate_limiter(config.api_rpm),
            config: Arc::new(config),
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
