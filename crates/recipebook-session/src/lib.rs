//! Session store with a fast in-memory tier and a durable backing tier.
//!
//! This crate provides the authentication session layer for Recipebook:
//! - Cryptographically random, URL-safe session tokens
//! - An in-memory cache guarded by a single mutex (the fast path)
//! - A [`SessionPersistence`] hook consulted on cache misses (the fallback path)
//! - Absolute expiry: a session is valid iff `now < login_time + max_life_time`
//! - A cancellable background task purging expired sessions from storage
//!
//! # Example
//!
//! ```rust,ignore
//! use recipebook_session::{CleanupTask, SessionConfig, SessionStore};
//!
//! let config = SessionConfig::default()
//!     .with_max_life_time(Duration::from_secs(3600))
//!     .with_cleanup_interval(Duration::from_secs(600));
//!
//! let store = SessionStore::new(config, persistence);
//! let cleanup = CleanupTask::spawn(store.clone());
//!
//! let session = store.start(None, user_id)?;
//! assert!(store.read(&session.token)?.is_some());
//!
//! cleanup.shutdown().await;
//! ```

mod cleanup;
mod clock;
mod config;
mod error;
mod persistence;
mod session;
mod store;
mod token;

pub use cleanup::CleanupTask;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use persistence::{MemoryPersistence, SessionPersistence};
pub use session::{Session, UserId};
pub use store::SessionStore;
pub use token::{TOKEN_BYTES, generate_token, token_prefix};
