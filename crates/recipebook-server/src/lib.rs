//! HTTP API server for Recipebook.
//!
//! This crate exposes the recipe catalog over HTTP:
//!
//! - Account registration, cookie-session login and logout
//! - Recipe listing, CRUD and rating
//! - Filtered search driven by a JSON [`SearchQuery`](recipebook_search::SearchQuery)
//! - Rate limiting and request logging middleware
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use recipebook_server::{Server, ServerConfig};
//! use recipebook_session::{SessionConfig, SessionStore};
//! use recipebook_store::Database;
//!
//! let db = Arc::new(Database::open("recipebook.db")?);
//! let sessions = SessionStore::new(SessionConfig::default(), Arc::clone(&db));
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8080".parse()?);
//!
//! Server::new(db, sessions, config).run(shutdown_signal()).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod password;
pub mod ratelimit;
pub mod routes;
pub mod state;

pub use auth::{AuthError, AuthSession};
pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use ratelimit::{rate_limit_middleware, request_logging_middleware};
pub use state::{AppState, Sessions};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use recipebook_store::Database;

/// The Recipebook HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server over a database and session store.
    pub fn new(db: Arc<Database>, sessions: Sessions, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(db, sessions, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{get, post, put};

        Router::new()
            .merge(routes::health_routes())
            // Accounts
            .route("/register", post(routes::register_handler))
            .route("/login", post(routes::login_handler))
            .route("/logout", post(routes::logout_handler))
            // Recipes
            .route(
                "/recipes",
                get(routes::list_recipes_handler).post(routes::create_recipe_handler),
            )
            .route(
                "/recipes/{id}",
                get(routes::get_recipe_handler)
                    .put(routes::update_recipe_handler)
                    .patch(routes::update_recipe_handler)
                    .delete(routes::delete_recipe_handler),
            )
            .route(
                "/recipes/{id}/rate",
                put(routes::rate_recipe_handler).patch(routes::rate_recipe_handler),
            )
            .route("/search", get(routes::search_handler))
            // Request logging (inner layer, runs first)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::request_logging_middleware,
            ))
            // Rate limiting (outer layer, runs before request logging)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address;
        self.run_on(addr, shutdown).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {addr}: {e}")))?;

        info!(%addr, "Starting server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {e}")))?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    /// Get the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
